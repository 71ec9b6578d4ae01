//! Tic-tac-toe rules, board codec and move engine.

pub mod codec;
mod engine;
pub mod rules;
mod types;

pub use codec::{BoardError, current_turn, decode, encode, encode_board};
pub use engine::{AppliedMove, MoveError, apply_move};
pub use rules::{WINNING_LINES, classify, detect_winner, is_draw};
pub use types::{BOARD_LEN, Board, Cell, GameState, GameStatus, Mark};
