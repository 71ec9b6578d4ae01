//! Database persistence layer for players, games and moves.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{
    GameRecord, GameUpdate, MoveRecord, NewGame, NewMove, NewPlayer, Player, mark_from_db,
    status_to_db, winner_to_db,
};
pub use repository::GameRepository;
