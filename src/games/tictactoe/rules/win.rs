//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Mark};
use tracing::instrument;

/// The eight lines that win the game.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns the mark filling any winning line, `None` otherwise. Lines are
/// checked in order, so a board with lines of both marks (unreachable by
/// legal play) reports the first one found.
#[instrument(skip(board))]
pub fn detect_winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in WINNING_LINES {
        let cell = board.get(a);
        if let Some(Cell::Marked(mark)) = cell
            && cell == board.get(b)
            && cell == board.get(c)
        {
            return Some(mark);
        }
    }

    None
}
