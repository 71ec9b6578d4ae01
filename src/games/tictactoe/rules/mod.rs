//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Status is never tracked incrementally;
//! it is recomputed from the board with [`classify`].

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{WINNING_LINES, detect_winner};

use super::{Board, GameStatus};
use tracing::instrument;

/// Derives the status of a board.
#[instrument(skip(board))]
pub fn classify(board: &Board) -> GameStatus {
    if let Some(winner) = detect_winner(board) {
        GameStatus::Won(winner)
    } else if is_draw(board) {
        GameStatus::Draw
    } else {
        GameStatus::InProgress
    }
}
