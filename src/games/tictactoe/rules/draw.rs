//! Draw detection logic for tic-tac-toe.

use super::super::Board;
use super::win::detect_winner;
use tracing::instrument;

/// Checks if the board is full (no empty cell left).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| !c.is_empty())
}

/// A full board with no winner is a draw.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && detect_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::codec::decode;

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
        assert!(!is_draw(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_draw() {
        let board = decode("XO  X    ").unwrap();
        assert!(!is_full(&board));
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let board = decode("XOXOXXOXO").unwrap();
        assert!(is_full(&board));
        assert!(is_draw(&board));
    }

    #[test]
    fn test_full_board_with_winner_is_not_draw() {
        // X X X / O O X / X O O
        let board = decode("XXXOOXXOO").unwrap();
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }
}
