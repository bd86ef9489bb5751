//! Chat-loop command parsing.
//!
//! The interactive loop accepts the same command surface as the CLI
//! subcommands, plus `help` and `exit`.

use console::style;

/// Available commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Start a new game.
    NewGame,
    /// Submit a move in coordinate notation.
    Move(String),
    /// Show the current board.
    ShowBoard,
    /// Show the game record.
    ShowPgn,
    /// Show available commands.
    Help,
    /// Leave the chat session.
    Exit,
    /// Anything unrecognized.
    Unknown(String),
}

/// Parse one line of chat input.
///
/// Returns `None` for blank lines. Bare move text (e.g. `e2e4`) is accepted
/// as shorthand for `move e2e4`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim().to_string());

    match cmd.as_str() {
        "new-game" | "new" | "play" => Some(ChatCommand::NewGame),
        // spaced input like `move e2 e4` is joined; a bare `move` falls
        // through to the orchestrator's malformed-move message
        "move" => Some(ChatCommand::Move(join_move_text(
            arg.as_deref().unwrap_or(""),
        ))),
        "show-board" | "board" => Some(ChatCommand::ShowBoard),
        "show-pgn" | "show-record" | "pgn" => Some(ChatCommand::ShowPgn),
        "help" | "?" => Some(ChatCommand::Help),
        "exit" | "quit" => Some(ChatCommand::Exit),
        other if looks_like_move(other) && arg.is_none() => {
            Some(ChatCommand::Move(other.to_string()))
        }
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Join move text split across tokens (`e2 e4` becomes `e2e4`).
pub fn join_move_text(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Loose shape check for bare move shorthand: 4 or 5 chars of square
/// coordinates plus an optional promotion piece. Legality is the
/// orchestrator's call.
fn looks_like_move(text: &str) -> bool {
    let bytes = text.as_bytes();
    if !(4..=5).contains(&bytes.len()) {
        return false;
    }
    bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_lowercase()
        && bytes[3].is_ascii_digit()
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("new-game").cyan(), "Start a new game (you play White)");
    println!("  {}  {}", style("move <uci>").cyan(), "Play a move, e.g. move e2e4");
    println!("  {}   {}", style("show-board").cyan(), "Show the current board");
    println!("  {}     {}", style("show-pgn").cyan(), "Show the game record");
    println!("  {}         {}", style("help").cyan(), "Show this help message");
    println!("  {}         {}", style("exit").cyan(), "Leave the session");
    println!();
}
