//! Game session orchestration for Gambit.
//!
//! This module defines the `SessionRepository` and `MoveEngine` traits that
//! the infrastructure layer implements, and the `GameService` that owns the
//! per-session move exchange.

pub mod engine;
pub mod repository;
pub mod service;
