//! Gambit CLI entry point.
//!
//! Binary name: `gambit`
//!
//! Parses CLI arguments, initializes the database and the game service, then
//! dispatches to the appropriate command handler or the interactive chat loop.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,gambit=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::NewGame { session } => {
            cli::game::print_reply(&session, &cli::game::new_game(&state, &session).await);
        }

        Commands::Move { text, session } => {
            let text = cli::commands::join_move_text(&text.join(" "));
            cli::game::print_reply(&session, &cli::game::submit_move(&state, &session, &text).await);
        }

        Commands::ShowBoard { session } => {
            cli::game::print_reply(&session, &cli::game::show_board(&state, &session).await);
        }

        Commands::ShowPgn { session } => {
            cli::game::print_reply(&session, &cli::game::show_record(&state, &session).await);
        }

        Commands::Chat { session } => {
            let session = session.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
            cli::chat::run_chat_loop(&state, &session).await?;
        }
    }

    Ok(())
}
