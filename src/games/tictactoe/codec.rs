//! Conversion between the stored 9-character board and [`Board`].
//!
//! Storage form is one character per cell in row-major order: `'X'`, `'O'`,
//! or a space for an empty cell.

use super::types::{BOARD_LEN, Board, Cell, Mark};
use derive_more::{Display, Error};
use tracing::instrument;

/// Stored character for an empty cell.
pub const EMPTY_CELL: char = ' ';

/// A board that cannot be decoded or encoded.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Board does not hold exactly nine cells.
    #[display("Malformed board: expected {} cells, found {}", BOARD_LEN, len)]
    WrongLength {
        /// Number of cells found.
        len: usize,
    },
    /// A stored cell is not `X`, `O` or a space.
    #[display("Malformed board: invalid cell {:?} at position {}", found, position)]
    InvalidCell {
        /// Offending position.
        position: usize,
        /// Offending character.
        found: char,
    },
}

/// Decodes a stored board string into nine cells.
///
/// # Errors
///
/// Returns [`BoardError`] if the string does not hold exactly nine valid cells.
#[instrument]
pub fn decode(board: &str) -> Result<Board, BoardError> {
    let chars: Vec<char> = board.chars().collect();
    if chars.len() != BOARD_LEN {
        return Err(BoardError::WrongLength { len: chars.len() });
    }

    let mut cells = [Cell::Empty; BOARD_LEN];
    for (position, c) in chars.into_iter().enumerate() {
        cells[position] = match c {
            EMPTY_CELL => Cell::Empty,
            other => Mark::from_char(other)
                .map(Cell::Marked)
                .ok_or(BoardError::InvalidCell {
                    position,
                    found: other,
                })?,
        };
    }
    Ok(Board::from_cells(cells))
}

/// Encodes cells into the stored board string.
///
/// # Errors
///
/// Returns [`BoardError::WrongLength`] unless exactly nine cells are given.
#[instrument(skip(cells), fields(len = cells.len()))]
pub fn encode(cells: &[Cell]) -> Result<String, BoardError> {
    if cells.len() != BOARD_LEN {
        return Err(BoardError::WrongLength { len: cells.len() });
    }
    Ok(cells
        .iter()
        .map(|cell| cell.mark().map_or(EMPTY_CELL, Mark::as_char))
        .collect())
}

/// Encodes a [`Board`], which always holds nine cells.
pub fn encode_board(board: &Board) -> String {
    board
        .cells()
        .iter()
        .map(|cell| cell.mark().map_or(EMPTY_CELL, Mark::as_char))
        .collect()
}

/// Infers whose turn it is from the mark counts.
///
/// X moves first, so equal counts mean X is to move.
#[instrument(skip(board))]
pub fn current_turn(board: &Board) -> Mark {
    if board.count(Mark::X) == board.count(Mark::O) {
        Mark::X
    } else {
        Mark::O
    }
}
