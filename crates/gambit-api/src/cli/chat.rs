//! Interactive chat session.
//!
//! Wraps `rustyline_async::Readline` for async line input and dispatches each
//! line through the command parser to the game service, printing plain-text
//! replies. Ctrl+C and Ctrl+D leave the session; the game stays persisted and
//! can be resumed by reopening the same session id.

use std::io::Write;

use console::style;
use rustyline_async::{Readline, ReadlineEvent, SharedWriter};

use crate::cli::commands::{self, ChatCommand};
use crate::cli::game;
use crate::state::AppState;

/// Events produced by the input handler.
enum InputEvent {
    /// User submitted a line.
    Line(String),
    /// End of file (Ctrl+D) or interrupt (Ctrl+C).
    Closed,
}

async fn read_line(rl: &mut Readline) -> InputEvent {
    match rl.readline().await {
        Ok(ReadlineEvent::Line(line)) => InputEvent::Line(line.trim().to_string()),
        Ok(ReadlineEvent::Eof) | Ok(ReadlineEvent::Interrupted) | Err(_) => InputEvent::Closed,
    }
}

/// Run the interactive chat loop for one session.
pub async fn run_chat_loop(state: &AppState, session_id: &str) -> anyhow::Result<()> {
    let (mut rl, mut stdout) = Readline::new(format!("{session_id}> "))?;

    writeln!(
        stdout,
        "{} session {}",
        style("Gambit").bold(),
        style(session_id).cyan()
    )?;
    writeln!(stdout, "Type 'new-game' to start, 'help' for commands.")?;

    loop {
        let line = match read_line(&mut rl).await {
            InputEvent::Line(line) => line,
            InputEvent::Closed => break,
        };
        rl.add_history_entry(line.clone());

        let Some(command) = commands::parse(&line) else {
            continue;
        };

        match command {
            ChatCommand::NewGame => reply(&mut stdout, &game::new_game(state, session_id).await)?,
            ChatCommand::Move(text) => {
                reply(&mut stdout, &game::submit_move(state, session_id, &text).await)?
            }
            ChatCommand::ShowBoard => {
                reply(&mut stdout, &game::show_board(state, session_id).await)?
            }
            ChatCommand::ShowPgn => {
                reply(&mut stdout, &game::show_record(state, session_id).await)?
            }
            ChatCommand::Help => commands::print_help(),
            ChatCommand::Exit => break,
            ChatCommand::Unknown(what) => reply(
                &mut stdout,
                &format!("Unknown command '{what}'. Type 'help' for the list."),
            )?,
        }
    }

    Ok(())
}

fn reply(stdout: &mut SharedWriter, text: &str) -> std::io::Result<()> {
    writeln!(stdout, "{text}")?;
    writeln!(stdout)?;
    Ok(())
}
