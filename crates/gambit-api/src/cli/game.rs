//! Command handlers translating transport commands into orchestrator calls.
//!
//! Each handler maps to exactly one `GameService` call and renders the result
//! (or its error) as plain text. Every error variant gets its own distinct,
//! user-recoverable message; engine and store failures never read as success.

use console::style;

use gambit_types::error::{EngineError, GameError};
use gambit_types::game::{BoardView, GameSession, MoveExchange};

use crate::state::AppState;

/// Render a game error as the message shown to the user.
pub fn user_message(err: &GameError) -> String {
    match err {
        GameError::NoActiveGame => "No active game. Start one with new-game.".to_string(),
        GameError::MalformedMove(text) => {
            format!("'{text}' is not a move. Use coordinate notation like e2e4.")
        }
        GameError::IllegalMove(text) => {
            format!("{text} is not legal in this position. Try another move.")
        }
        GameError::Engine(EngineError::Timeout { .. }) => {
            "The engine ran out of time. Nothing was changed; try again.".to_string()
        }
        GameError::Engine(_) => {
            "The engine is unavailable right now. Nothing was changed; try again shortly."
                .to_string()
        }
        GameError::Store(_) => {
            "Could not save the game. Nothing was changed; try again.".to_string()
        }
        GameError::CorruptPosition(_) => {
            "The stored game is unreadable. Start a fresh one with new-game.".to_string()
        }
    }
}

fn render_session(session: &GameSession) -> String {
    format!(
        "New game created. You play White. Make your move with: move e2e4\n\nFEN:\n{}",
        session.fen
    )
}

fn render_exchange(exchange: &MoveExchange) -> String {
    let mut out = format!("You played: {}", exchange.user_move.san);
    if let Some(reply) = &exchange.engine_move {
        out.push_str(&format!("\nEngine played: {}", reply.san));
    }
    if let Some(outcome) = exchange.outcome {
        out.push_str(&format!("\n\nGame over: {outcome}"));
    }
    out.push_str(&format!("\n\nFEN:\n{}", exchange.fen));
    out
}

fn render_board(board: &BoardView) -> String {
    let mut out = format!("{}\n\nFEN:\n{}", board.ascii, board.fen);
    if let Some(outcome) = board.outcome {
        out.push_str(&format!("\n\nGame over: {outcome}"));
    }
    out
}

/// `new-game` -> StartGame.
pub async fn new_game(state: &AppState, session_id: &str) -> String {
    match state.game_service.start_game(session_id).await {
        Ok(session) => render_session(&session),
        Err(err) => user_message(&err),
    }
}

/// `move <text>` -> SubmitMove.
pub async fn submit_move(state: &AppState, session_id: &str, text: &str) -> String {
    match state.game_service.submit_move(session_id, text).await {
        Ok(exchange) => render_exchange(&exchange),
        Err(err) => user_message(&err),
    }
}

/// `show-board` -> GetBoard.
pub async fn show_board(state: &AppState, session_id: &str) -> String {
    match state.game_service.board(session_id).await {
        Ok(board) => render_board(&board),
        Err(err) => user_message(&err),
    }
}

/// `show-pgn` / `show-record` -> GetRecord.
pub async fn show_record(state: &AppState, session_id: &str) -> String {
    match state.game_service.record(session_id).await {
        Ok(record) if record.is_empty() => "No moves played yet.".to_string(),
        Ok(record) => record,
        Err(err) => user_message(&err),
    }
}

/// Print a reply with a dimmed session prefix.
pub fn print_reply(session_id: &str, reply: &str) {
    println!("{}", style(format!("[{session_id}]")).dim());
    println!("{reply}");
}
