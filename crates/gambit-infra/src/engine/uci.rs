//! Per-call UCI engine subprocess client.
//!
//! Implements [`MoveEngine`] by spawning the configured engine binary
//! (e.g. Stockfish) for each move request, feeding it the position over
//! stdin and reading the `bestmove` line from stdout. The process is killed
//! on every exit path; `kill_on_drop` is the backstop if the future is
//! cancelled mid-call.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use gambit_core::game::engine::MoveEngine;
use gambit_types::error::EngineError;

/// Extra time beyond the thinking budget to cover process startup and the
/// engine wrapping up its search.
const STARTUP_GRACE: Duration = Duration::from_secs(2);

/// UCI engine client spawning one short-lived process per move request.
#[derive(Debug, Clone)]
pub struct UciEngineClient {
    engine_path: PathBuf,
}

impl UciEngineClient {
    /// Create a client for the engine binary at `engine_path`.
    ///
    /// The binary is not checked here; a missing or broken binary surfaces
    /// as [`EngineError::Unavailable`] on the first request.
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
        }
    }
}

/// Extract the move token from a UCI `bestmove` line.
///
/// `bestmove (none)` means the engine had no move to offer and maps to `None`.
fn parse_bestmove(line: &str) -> Option<&str> {
    let token = line.strip_prefix("bestmove ")?.split_whitespace().next()?;
    if token == "(none)" { None } else { Some(token) }
}

impl MoveEngine for UciEngineClient {
    async fn request_move(&self, fen: &str, budget: Duration) -> Result<String, EngineError> {
        let mut child = Command::new(&self.engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "failed to spawn {}: {e}",
                    self.engine_path.display()
                ))
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(EngineError::Protocol("engine stdin unavailable".to_string()));
        };
        let Some(stdout) = child.stdout.take() else {
            return Err(EngineError::Protocol("engine stdout unavailable".to_string()));
        };

        let request = format!(
            "uci\nucinewgame\nposition fen {fen}\ngo movetime {}\n",
            budget.as_millis()
        );
        debug!(engine = %self.engine_path.display(), %fen, "requesting engine move");

        let result = tokio::time::timeout(budget + STARTUP_GRACE, async {
            stdin
                .write_all(request.as_bytes())
                .await
                .map_err(|e| EngineError::Unavailable(format!("engine rejected input: {e}")))?;
            stdin
                .flush()
                .await
                .map_err(|e| EngineError::Unavailable(format!("engine rejected input: {e}")))?;

            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| EngineError::Unavailable(format!("engine output unreadable: {e}")))?
            {
                if line.starts_with("bestmove") {
                    return parse_bestmove(&line).map(str::to_string).ok_or_else(|| {
                        EngineError::Protocol("engine returned no move".to_string())
                    });
                }
            }
            Err(EngineError::Protocol(
                "engine closed its output without a bestmove".to_string(),
            ))
        })
        .await;

        // reap the process on every path before reporting the result
        let _ = child.kill().await;

        match result {
            Ok(inner) => inner,
            Err(_elapsed) => Err(EngineError::Timeout {
                budget_secs: budget.as_secs_f64(),
            }),
        }
    }
}
