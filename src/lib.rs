//! Tic-tac-toe backend library.
//!
//! Players register, start games, and submit moves over an HTTP API. Games and
//! their move histories persist in SQLite, and a leaderboard is derived from
//! finished games.
//!
//! # Architecture
//!
//! - **Games**: pure tic-tac-toe rules (board codec, win/draw detection, move engine)
//! - **Db**: diesel repository over SQLite with compare-and-swap move commits
//! - **Service**: [`GameService`] composes rules and storage
//! - **Leaderboard**: [`Leaderboard`] aggregates finished games
//! - **Api**: axum router exposing everything as JSON
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tictactoe_backend::{Cell, GameRepository, GameService, Mark};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::open("tictactoe.db".to_string(), Duration::from_secs(5))?;
//! let service = GameService::new(repository);
//! let game = service.create_game(None, None)?;
//! let game = service.submit_move(*game.id(), 4, None)?;
//! assert_eq!(game.board().get(4), Some(Cell::Marked(Mark::X)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
mod config;
mod db;
mod error;
mod game_service;
pub mod games;
mod leaderboard;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Storage
pub use db::{
    DbError, DbErrorKind, GameRecord, GameRepository, GameUpdate, MoveRecord, NewGame, NewMove,
    NewPlayer, Player,
};

// Crate-level exports - Services
pub use error::GameError;
pub use game_service::{GameService, MAX_DISPLAY_NAME_LEN, MAX_USERNAME_LEN, load_state};
pub use leaderboard::{DEFAULT_SCAN_LIMIT, FinishedGame, Leaderboard, LeaderboardEntry, tally};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, BoardError, Cell, GameState, GameStatus, Mark, MoveError, apply_move, classify,
};
