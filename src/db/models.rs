//! Database models and storage encodings.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};
use crate::games::tictactoe::{GameStatus, Mark};

/// Player database model.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    username: String,
    display_name: Option<String>,
    created_at: NaiveDateTime,
}

/// Insertable player model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    username: String,
    display_name: Option<String>,
}

/// Game database model. The board is the 9-character storage form.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: i32,
    board: String,
    status: String,
    winner: Option<String>,
    player_x_id: Option<i32>,
    player_o_id: Option<i32>,
    started_at: NaiveDateTime,
    finished_at: Option<NaiveDateTime>,
}

impl GameRecord {
    /// Parses the stored status and winner columns into a [`GameStatus`].
    #[instrument(skip(self), fields(id = self.id, status = %self.status))]
    pub fn parse_status(&self) -> Result<GameStatus, DbError> {
        status_from_db(&self.status, self.winner.as_deref())
    }
}

/// Insertable game model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    board: String,
    status: String,
    player_x_id: Option<i32>,
    player_o_id: Option<i32>,
}

/// Column values written when a move is committed.
#[derive(Debug, Clone, new, Getters)]
pub struct GameUpdate {
    board: String,
    status: String,
    winner: Option<String>,
    finished_at: Option<NaiveDateTime>,
}

/// Move database model.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Associations, Selectable, Getters,
)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRecord, foreign_key = game_id))]
pub struct MoveRecord {
    id: i32,
    game_id: i32,
    player_id: Option<i32>,
    position: i32,
    mark: String,
    created_at: NaiveDateTime,
}

/// Insertable move model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::moves)]
pub struct NewMove {
    game_id: i32,
    player_id: Option<i32>,
    position: i32,
    mark: String,
}

/// Stored form of [`GameStatus::InProgress`].
pub const STATUS_IN_PROGRESS: &str = "in_progress";
const STATUS_X_WON: &str = "x_won";
const STATUS_O_WON: &str = "o_won";
const STATUS_DRAW: &str = "draw";

/// Stored forms of every terminal status.
pub const TERMINAL_STATUSES: [&str; 3] = [STATUS_X_WON, STATUS_O_WON, STATUS_DRAW];

/// Converts a status to the string stored in the database.
pub fn status_to_db(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => STATUS_IN_PROGRESS,
        GameStatus::Won(Mark::X) => STATUS_X_WON,
        GameStatus::Won(Mark::O) => STATUS_O_WON,
        GameStatus::Draw => STATUS_DRAW,
    }
}

/// Converts a winner to the string stored in the database.
pub fn winner_to_db(status: GameStatus) -> Option<String> {
    status.winner().map(|mark| mark.to_string())
}

/// Parses the stored status, checking it agrees with the stored winner.
///
/// # Errors
///
/// Returns [`DbError`] for an unknown status or a winner column that
/// disagrees with it.
#[instrument]
pub fn status_from_db(status: &str, winner: Option<&str>) -> Result<GameStatus, DbError> {
    let parsed = match status {
        STATUS_IN_PROGRESS => GameStatus::InProgress,
        STATUS_X_WON => GameStatus::Won(Mark::X),
        STATUS_O_WON => GameStatus::Won(Mark::O),
        STATUS_DRAW => GameStatus::Draw,
        _ => {
            return Err(DbError::new(DbErrorKind::Query(format!(
                "Invalid status: '{}'",
                status
            ))));
        }
    };

    let expected = winner_to_db(parsed);
    if expected.as_deref() != winner {
        return Err(DbError::new(DbErrorKind::Query(format!(
            "Winner {:?} disagrees with status '{}'",
            winner, status
        ))));
    }
    Ok(parsed)
}

/// Parses a stored mark.
///
/// # Errors
///
/// Returns [`DbError`] unless the value is `"X"` or `"O"`.
pub fn mark_from_db(mark: &str) -> Result<Mark, DbError> {
    let mut chars = mark.chars();
    match (chars.next().and_then(Mark::from_char), chars.next()) {
        (Some(parsed), None) => Ok(parsed),
        _ => Err(DbError::new(DbErrorKind::Query(format!(
            "Invalid mark: '{}'",
            mark
        )))),
    }
}
