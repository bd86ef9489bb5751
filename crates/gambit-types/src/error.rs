use thiserror::Error;

/// Errors from game operations, returned by the orchestrator.
///
/// Every variant maps to a distinct user-facing message in the CLI layer.
/// `Engine` and `Store` failures guarantee the stored session is unchanged,
/// so the same move can be retried.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no active game for this session")]
    NoActiveGame,

    #[error("malformed move '{0}': expected coordinate notation like e2e4")]
    MalformedMove(String),

    #[error("illegal move '{0}' in the current position")]
    IllegalMove(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] RepositoryError),

    #[error("stored position is corrupt: {0}")]
    CorruptPosition(String),
}

/// Errors from the external move-generation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("engine exceeded its {budget_secs}s time budget")]
    Timeout { budget_secs: f64 },

    #[error("engine protocol error: {0}")]
    Protocol(String),
}

/// Errors from repository operations (used by trait definitions in gambit-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_error_display() {
        let err = GameError::MalformedMove("z9z9".to_string());
        assert_eq!(
            err.to_string(),
            "malformed move 'z9z9': expected coordinate notation like e2e4"
        );
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Timeout { budget_secs: 0.25 };
        assert_eq!(err.to_string(), "engine exceeded its 0.25s time budget");
    }

    #[test]
    fn test_engine_error_transparent_through_game_error() {
        let err = GameError::from(EngineError::Unavailable("spawn failed".to_string()));
        assert_eq!(err.to_string(), "engine unavailable: spawn failed");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }
}
