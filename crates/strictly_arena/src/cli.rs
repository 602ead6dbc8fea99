//! Command-line interface for strictly_arena.

use clap::{Parser, Subcommand};
use strictly_othello::{Color, Difficulty};

/// Strictly Othello - console Othello with online play and an automated opponent
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Othello: local, online, or against an oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file (defaults apply if missing)
    #[arg(short, long, default_value = "strictly_othello.toml", global = true)]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the match coordinator
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Two players at this console
    Local,

    /// Play a remote opponent through a coordinator
    Online {
        /// Coordinator host
        #[arg(long)]
        host: Option<String>,

        /// Coordinator port
        #[arg(short, long)]
        port: Option<u16>,

        /// Identity announced to the coordinator
        #[arg(short, long)]
        user_id: Option<String>,
    },

    /// Play against the oracle
    Ai {
        /// Oracle difficulty (easy, medium, hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Color you play (black moves first)
        #[arg(long, default_value = "black")]
        human_color: Color,
    },

    /// Show recorded results for a profile
    Stats {
        /// Profile to show (defaults to the configured user)
        #[arg(short, long)]
        user_id: Option<String>,

        /// Number of recent matches to list
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}
