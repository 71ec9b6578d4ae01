//! Errors surfaced by game, player and leaderboard operations.

use derive_more::{Display, Error, From};

use crate::db::DbError;
use crate::games::tictactoe::{BoardError, MoveError};

/// Error returned by [`GameService`](crate::GameService) and
/// [`Leaderboard`](crate::Leaderboard).
///
/// Everything except [`GameError::MalformedBoard`],
/// [`GameError::InconsistentState`] and [`GameError::Storage`] is caused by
/// caller input and is detected before any write.
#[derive(Debug, Display, Error, From)]
pub enum GameError {
    /// No game has this id.
    #[display("Game {} not found", _0)]
    GameNotFound(#[error(not(source))] i32),

    /// No player has this id.
    #[display("Player {} not found", _0)]
    PlayerNotFound(#[error(not(source))] i32),

    /// The move breaks a game rule or the turn order.
    #[display("{}", _0)]
    #[from]
    Move(MoveError),

    /// Another player already uses this username.
    #[display("Username '{}' is already taken", _0)]
    UsernameTaken(#[error(not(source))] String),

    /// A request field failed validation.
    #[display("Invalid input: {}", _0)]
    InvalidInput(#[error(not(source))] String),

    /// A concurrent write changed the game between read and commit.
    #[display("Game {} was modified concurrently; reload and retry", _0)]
    PersistenceConflict(#[error(not(source))] i32),

    /// The stored board of a game cannot be decoded.
    #[display("Game {} has a corrupt board: {}", game_id, source)]
    MalformedBoard {
        /// Affected game.
        game_id: i32,
        /// Decoding failure.
        source: BoardError,
    },

    /// The stored status or winner of a game disagrees with its board.
    #[display("Game {} has a status inconsistent with its board", _0)]
    InconsistentState(#[error(not(source))] i32),

    /// The store failed.
    #[display("{}", _0)]
    #[from]
    Storage(DbError),
}

impl GameError {
    /// Checks if the error indicates corrupt persisted state or a store
    /// failure rather than bad caller input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GameError::MalformedBoard { .. }
                | GameError::InconsistentState(_)
                | GameError::Storage(_)
        )
    }
}
