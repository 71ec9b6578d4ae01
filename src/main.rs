//! Tic-tac-toe backend - server entry point.

#![warn(missing_docs)]

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_backend::{
    GameRepository, GameService, Leaderboard, ServerConfig,
    api::{self, AppState},
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_backend=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            db_path,
        } => {
            let config = load_config(config, host, port, db_path)?;
            run_server(config).await
        }
        Command::Migrate { config, db_path } => {
            let config = load_config(config, None, None, db_path)?;
            run_migrations(&config)
        }
    }
}

/// Resolves configuration: defaults, then file, then environment, then flags.
fn load_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
) -> Result<ServerConfig> {
    let config = ServerConfig::load(path.as_deref()).context("Failed to load configuration")?;
    config
        .with_overrides(host, port, db_path)
        .context("Invalid command-line option")
}

/// Opens the store and serves the HTTP API until ctrl-c.
#[instrument(skip_all, fields(db_path = %config.db_path(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting tic-tac-toe server");

    let repository = GameRepository::open(config.db_path().clone(), config.busy_timeout())
        .context("Failed to open database")?;
    let game_service = GameService::new(repository.clone());
    let leaderboard = Leaderboard::new(repository, *config.leaderboard_scan_limit());
    let state = AppState::new(game_service, leaderboard);

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Server ready");

    api::serve(listener, state).await?;
    info!("Server stopped");
    Ok(())
}

/// Opens the store, which applies pending migrations, and exits.
#[instrument(skip_all, fields(db_path = %config.db_path()))]
fn run_migrations(config: &ServerConfig) -> Result<()> {
    GameRepository::open(config.db_path().clone(), config.busy_timeout())
        .context("Failed to migrate database")?;
    info!("Migrations applied");
    Ok(())
}
