//! Shared domain types for Gambit.
//!
//! This crate contains the core domain types used across the Gambit service:
//! game sessions, move exchange results, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod game;
