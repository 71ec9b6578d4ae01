//! Command-line interface for tictactoe_backend.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tic-tac-toe backend - HTTP game server with persistent history
#[derive(Parser, Debug)]
#[command(name = "tictactoe_backend")]
#[command(about = "Tic-tac-toe HTTP backend backed by SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long)]
        db_path: Option<String>,
    },
}
