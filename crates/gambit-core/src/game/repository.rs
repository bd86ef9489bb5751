//! SessionRepository trait definition.
//!
//! Durable per-session game persistence: point loads and full-replace saves
//! keyed by session id.

use gambit_types::error::RepositoryError;
use gambit_types::game::GameSession;

/// Repository trait for game session persistence.
///
/// Implementations live in gambit-infra (e.g., `SqliteGameRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// Contract: `save` replaces any prior record under the session id wholesale
/// (no partial-field update), and a `load` always observes the most recently
/// acknowledged `save` for that id.
pub trait SessionRepository: Send + Sync {
    /// Load the session for an id, or `None` if no game was ever started.
    fn load(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<GameSession>, RepositoryError>> + Send;

    /// Persist a session, replacing any prior record under the same id.
    fn save(
        &self,
        session: &GameSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
