//! SQLite persistence for Gambit.

pub mod game;
pub mod pool;
