//! Global configuration types for Gambit.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! engine binary location and the per-move thinking budget.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Gambit service.
///
/// Loaded from `~/.gambit/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Path to the UCI engine binary spawned for each move request.
    #[serde(default = "default_engine_path")]
    pub engine_path: String,

    /// Thinking-time budget per engine move, in seconds.
    #[serde(default = "default_move_time_secs")]
    pub move_time_secs: f64,
}

fn default_engine_path() -> String {
    "/usr/games/stockfish".to_string()
}

fn default_move_time_secs() -> f64 {
    0.25
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            move_time_secs: default_move_time_secs(),
        }
    }
}
