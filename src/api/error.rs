//! Mapping of service errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::GameError;
use crate::games::tictactoe::MoveError;

/// Error returned by HTTP handlers.
#[derive(Debug, Display, From)]
pub enum ApiError {
    /// A service operation failed.
    #[display("{}", _0)]
    Game(GameError),
    /// A query parameter failed validation.
    #[display("Invalid input: {}", _0)]
    #[from(ignore)]
    BadRequest(String),
    /// The blocking task running a store call failed.
    #[display("Task failed: {}", _0)]
    #[from(ignore)]
    Task(String),
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind.
    pub code: String,
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Game(GameError::GameNotFound(_) | GameError::PlayerNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Game(GameError::Move(_) | GameError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Game(GameError::UsernameTaken(_) | GameError::PersistenceConflict(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Game(
                GameError::MalformedBoard { .. }
                | GameError::InconsistentState(_)
                | GameError::Storage(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Game(e) => match e {
                GameError::GameNotFound(_) => "game_not_found",
                GameError::PlayerNotFound(_) => "player_not_found",
                GameError::Move(MoveError::GameNotInProgress) => "game_not_in_progress",
                GameError::Move(MoveError::PositionOutOfRange(_)) => "position_out_of_range",
                GameError::Move(MoveError::CellOccupied(_)) => "cell_occupied",
                GameError::Move(MoveError::WrongTurn(_)) => "wrong_turn",
                GameError::UsernameTaken(_) => "username_taken",
                GameError::InvalidInput(_) => "invalid_input",
                GameError::PersistenceConflict(_) => "persistence_conflict",
                GameError::MalformedBoard { .. }
                | GameError::InconsistentState(_)
                | GameError::Storage(_) => "internal",
            },
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Task(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed with internal error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code().to_string(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}
