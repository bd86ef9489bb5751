//! MoveEngine trait definition.
//!
//! One move request per call against an external engine. Each call is
//! independent: no engine state persists across calls, so an engine crash in
//! one session cannot poison another.

use std::time::Duration;

use gambit_types::error::EngineError;

/// Trait for the external move-generation engine.
///
/// Implementations live in gambit-infra (e.g., `UciEngineClient`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait MoveEngine: Send + Sync {
    /// Request one move for the position described by `fen`, thinking for at
    /// most `budget`.
    ///
    /// Returns the move in coordinate notation (e.g. `e7e5`). The FEN carries
    /// everything the engine needs to reconstruct legal-move context: side to
    /// move, castling rights, and the en-passant target.
    ///
    /// Implementations must enforce the budget themselves and must not leak
    /// the engine process on any exit path.
    fn request_move(
        &self,
        fen: &str,
        budget: Duration,
    ) -> impl std::future::Future<Output = Result<String, EngineError>> + Send;
}
