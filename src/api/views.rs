//! Request and response bodies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::db::{MoveRecord, mark_from_db};
use crate::games::tictactoe::{GameState, GameStatus, Mark, current_turn};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: i64 = 1_000;

/// Request for registering a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    /// Unique username, 1-50 characters.
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Request for starting a game. Either slot may be left empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Player holding X.
    #[serde(default)]
    pub player_x_id: Option<i32>,
    /// Player holding O.
    #[serde(default)]
    pub player_o_id: Option<i32>,
}

/// Request for making a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitMoveRequest {
    /// Position on board (0-8, where 0=top-left, 8=bottom-right).
    pub position: i32,
    /// Player making the move, if known.
    #[serde(default)]
    pub player_id: Option<i32>,
}

/// `limit` / `offset` query parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Page size.
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
}

impl Pagination {
    /// Returns `(limit, offset)` with defaults applied, or `None` if either is
    /// out of range.
    pub fn resolve(&self) -> Option<(i64, i64)> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0);
        ((1..=MAX_PAGE_LIMIT).contains(&limit) && offset >= 0).then_some((limit, offset))
    }
}

/// Game as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Game id.
    pub id: i32,
    /// Nine cells, row-major; `null` for empty.
    pub board: Vec<Option<Mark>>,
    /// Mark to move next; `null` once the game is over.
    pub current_player: Option<Mark>,
    /// `"in-progress"`, `"won"` or `"draw"`.
    pub status: String,
    /// Winning mark, if any.
    pub winner: Option<Mark>,
    /// Player holding X.
    pub player_x_id: Option<i32>,
    /// Player holding O.
    pub player_o_id: Option<i32>,
    /// Creation time (UTC).
    pub started_at: NaiveDateTime,
    /// Finish time (UTC), set once the game is over.
    pub finished_at: Option<NaiveDateTime>,
}

impl From<&GameState> for GameView {
    fn from(game: &GameState) -> Self {
        let status = match game.status() {
            GameStatus::InProgress => "in-progress",
            GameStatus::Won(_) => "won",
            GameStatus::Draw => "draw",
        };
        Self {
            id: *game.id(),
            board: game.board().cells().iter().map(|c| c.mark()).collect(),
            current_player: (!game.status().is_terminal()).then(|| current_turn(game.board())),
            status: status.to_string(),
            winner: game.winner(),
            player_x_id: *game.player_x_id(),
            player_o_id: *game.player_o_id(),
            started_at: *game.started_at(),
            finished_at: *game.finished_at(),
        }
    }
}

/// One entry of a game's move history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveView {
    /// Move id; increases with play order.
    pub id: i32,
    /// Board position (0-8).
    pub position: i32,
    /// Mark placed.
    pub mark: Mark,
}

impl TryFrom<&MoveRecord> for MoveView {
    type Error = crate::db::DbError;

    fn try_from(record: &MoveRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *record.id(),
            position: *record.position(),
            mark: mark_from_db(record.mark())?,
        })
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"Healthy"`.
    pub message: String,
}
