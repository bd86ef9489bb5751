//! CLI argument definitions and command handlers.

pub mod chat;
pub mod commands;
pub mod game;

use clap::{Parser, Subcommand};

/// Gambit -- play chess against an engine, one game per session.
#[derive(Parser)]
#[command(name = "gambit", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new game (you play White), overwriting any game in progress
    NewGame {
        /// Session the game belongs to
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Submit a move in coordinate notation (e.g. e2e4, e7e8q)
    Move {
        /// The move text; spaced squares like `e2 e4` are joined
        #[arg(num_args = 1.., required = true)]
        text: Vec<String>,

        /// Session the game belongs to
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Show the current board
    ShowBoard {
        /// Session the game belongs to
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Show the game record
    #[command(alias = "show-record")]
    ShowPgn {
        /// Session the game belongs to
        #[arg(long, default_value = "default")]
        session: String,
    },

    /// Interactive chat session accepting the same commands
    Chat {
        /// Session id; a fresh one is generated when omitted
        #[arg(long)]
        session: Option<String>,
    },
}
