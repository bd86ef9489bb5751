//! Infrastructure implementations for Gambit.
//!
//! SQLite persistence for game sessions, the per-call UCI engine subprocess
//! client, and configuration loading. Implements the trait "ports" defined
//! in `gambit-core`.

pub mod config;
pub mod engine;
pub mod sqlite;
