//! Game session and move exchange types for Gambit.
//!
//! These types model one chess game per chat session: the persisted session
//! record, the result of a user/engine move exchange, and read-only board
//! projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// The persisted state of one ongoing game, keyed by session id.
///
/// Exactly one session exists per id; saving replaces any prior record
/// wholesale. A later `new-game` overwrites the session in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Opaque chat/session identifier supplied by the transport.
    pub session_id: String,
    /// Current position in FEN. Always a legal, reachable position.
    pub fen: String,
    /// Append-only SAN movetext (e.g. `1. e4 e5 2. Nf3`). Empty for a fresh game.
    pub record: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One half-move as played, in both notations the service reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    /// Coordinate notation as submitted or as returned by the engine (`e2e4`).
    pub uci: String,
    /// Standard algebraic notation in the position it was played (`e4`, `Qxf7#`).
    pub san: String,
}

/// Result of a successful move submission: the user's half-move, the engine's
/// reply, and the resulting game state.
///
/// `engine_move` is `None` when the user's half-move already ended the game;
/// the engine is not consulted for a terminal position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveExchange {
    pub user_move: PlayedMove,
    pub engine_move: Option<PlayedMove>,
    /// FEN after both half-moves (or after the user's, if the game ended).
    pub fen: String,
    /// Updated SAN movetext record.
    pub record: String,
    /// Set when the resulting position is terminal.
    pub outcome: Option<GameOutcome>,
}

/// Read-only projection of a session's board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub fen: String,
    /// Eight ranks of piece letters plus a file legend, for plain-text replies.
    pub ascii: String,
    pub outcome: Option<GameOutcome>,
}

/// Terminal result of a game, as reported by the position model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::WhiteWins => write!(f, "1-0"),
            GameOutcome::BlackWins => write!(f, "0-1"),
            GameOutcome::Draw => write!(f, "1/2-1/2"),
        }
    }
}
