//! Game orchestration logic for Gambit.
//!
//! This crate defines the "ports" (repository and engine traits) that the
//! infrastructure layer implements, the position model wrapper over
//! `shakmaty`, and the `GameService` orchestrator. It depends only on
//! `gambit-types` -- never on `gambit-infra` or any database/IO crate.

pub mod game;
pub mod position;
