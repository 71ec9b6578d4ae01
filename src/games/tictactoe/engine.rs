//! Move validation and state transition.
//!
//! [`apply_move`] is pure: it checks a proposed move against the rules and
//! turn order and returns the next in-memory state. Persisting it is the
//! caller's job.

use super::codec::current_turn;
use super::rules::classify;
use super::types::{BOARD_LEN, GameState, Mark};
use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::{debug, instrument};

/// Reasons a proposed move is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The game already ended.
    #[display("Game is not in progress")]
    GameNotInProgress,

    /// Position outside 0-8.
    #[display("Position {} is out of range (must be 0-8)", _0)]
    PositionOutOfRange(#[error(not(source))] i32),

    /// The target cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] usize),

    /// The acting player does not hold the slot of the mark to move.
    #[display("It is {}'s turn", _0)]
    WrongTurn(#[error(not(source))] Mark),
}

/// An accepted move and the state it produced.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AppliedMove {
    /// Game after the move.
    state: GameState,
    /// Position played.
    position: usize,
    /// Mark placed.
    mark: Mark,
}

impl AppliedMove {
    /// Consumes the move, returning the updated game.
    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Validates and applies a move at `position` on behalf of `acting_player`.
///
/// Turn enforcement is deliberately lenient: it only applies when an acting
/// player id is supplied and the slot of the mark to move is assigned. Fully
/// anonymous games and callers that omit the id may play either side.
///
/// # Errors
///
/// Returns [`MoveError`] without touching `game` if the move is illegal.
#[instrument(skip(game), fields(game_id = *game.id()))]
pub fn apply_move(
    game: &GameState,
    position: i32,
    acting_player: Option<i32>,
) -> Result<AppliedMove, MoveError> {
    if game.status().is_terminal() {
        return Err(MoveError::GameNotInProgress);
    }

    let pos = usize::try_from(position)
        .ok()
        .filter(|p| *p < BOARD_LEN)
        .ok_or(MoveError::PositionOutOfRange(position))?;

    let board = *game.board();
    if board.get(pos).is_some_and(|cell| !cell.is_empty()) {
        return Err(MoveError::CellOccupied(pos));
    }

    let mark = current_turn(&board);

    if game.has_assigned_players()
        && let Some(actor) = acting_player
        && let Some(expected) = game.slot(mark)
        && actor != expected
    {
        debug!(actor, expected, mark = %mark, "Move rejected: wrong turn");
        return Err(MoveError::WrongTurn(mark));
    }

    let next = board.with_mark(pos, mark);
    let status = classify(&next);
    debug!(position = pos, mark = %mark, status = ?status, "Move applied");

    Ok(AppliedMove {
        state: game.clone().advance(next, status),
        position: pos,
        mark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::codec::decode;
    use crate::games::tictactoe::{Board, GameStatus};
    use chrono::NaiveDateTime;

    fn game(stored: &str, x: Option<i32>, o: Option<i32>) -> GameState {
        let board = decode(stored).unwrap();
        GameState::new(
            1,
            board,
            classify(&board),
            x,
            o,
            NaiveDateTime::default(),
            None,
        )
    }

    fn play(state: &GameState, position: i32) -> GameState {
        apply_move(state, position, None).unwrap().into_state()
    }

    #[test]
    fn test_first_move_is_x() {
        let applied = apply_move(&game("         ", None, None), 4, None).unwrap();
        assert_eq!(*applied.mark(), Mark::X);
        assert_eq!(*applied.position(), 4);
        assert_eq!(*applied.state().status(), GameStatus::InProgress);
    }

    #[test]
    fn test_counts_stay_balanced() {
        let mut state = game("         ", None, None);
        for pos in [0, 4, 1, 2, 8, 6, 3, 5, 7] {
            if state.status().is_terminal() {
                break;
            }
            let before = state.board().cells().iter().filter(|c| !c.is_empty()).count();
            state = play(&state, pos);
            let board = state.board();
            let after = board.cells().iter().filter(|c| !c.is_empty()).count();
            assert_eq!(after, before + 1);
            let diff = board.count(Mark::X) as i64 - board.count(Mark::O) as i64;
            assert!(diff == 0 || diff == 1);
        }
    }

    #[test]
    fn test_scenario_no_line_yet() {
        let mut state = game("         ", None, None);
        for pos in [0, 4, 1, 2, 8] {
            state = play(&state, pos);
        }
        assert_eq!(*state.status(), GameStatus::InProgress);
        assert_eq!(state.winner(), None);
        for empty in [3, 5, 6, 7] {
            assert!(state.board().get(empty).unwrap().is_empty());
        }
    }

    #[test]
    fn test_scenario_x_wins_top_row() {
        let mut state = game("         ", Some(1), Some(2));
        for pos in [0, 3, 1, 4, 2] {
            state = play(&state, pos);
        }
        assert_eq!(*state.status(), GameStatus::Won(Mark::X));
        assert_eq!(state.winner(), Some(Mark::X));

        for pos in 0..9 {
            assert_eq!(
                apply_move(&state, pos, None),
                Err(MoveError::GameNotInProgress)
            );
        }
    }

    #[test]
    fn test_last_move_draws() {
        // X O X / X O O / O X _ with X to move.
        let state = game("XOXXOOOX ", None, None);
        let state = play(&state, 8);
        assert_eq!(*state.status(), GameStatus::Draw);
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let state = game("X        ", None, None);
        assert_eq!(apply_move(&state, 0, None), Err(MoveError::CellOccupied(0)));
    }

    #[test]
    fn test_position_out_of_range() {
        let state = game("         ", None, None);
        assert_eq!(
            apply_move(&state, 9, None),
            Err(MoveError::PositionOutOfRange(9))
        );
        assert_eq!(
            apply_move(&state, -1, None),
            Err(MoveError::PositionOutOfRange(-1))
        );
    }

    #[test]
    fn test_terminal_checked_before_position() {
        let state = game("XXXOO    ", None, None);
        assert_eq!(
            apply_move(&state, 42, None),
            Err(MoveError::GameNotInProgress)
        );
    }

    #[test]
    fn test_wrong_turn_enforced_for_assigned_slot() {
        let state = game("         ", Some(1), Some(2));
        assert_eq!(
            apply_move(&state, 0, Some(2)),
            Err(MoveError::WrongTurn(Mark::X))
        );
        assert!(apply_move(&state, 0, Some(1)).is_ok());
    }

    #[test]
    fn test_turn_not_enforced_without_actor() {
        let state = game("         ", Some(1), Some(2));
        assert!(apply_move(&state, 0, None).is_ok());
    }

    #[test]
    fn test_turn_not_enforced_for_anonymous_game() {
        let state = game("         ", None, None);
        assert!(apply_move(&state, 0, Some(99)).is_ok());
    }

    #[test]
    fn test_turn_not_enforced_when_current_slot_empty() {
        // Only O is assigned; X is to move.
        let state = game("         ", None, Some(2));
        assert!(apply_move(&state, 0, Some(7)).is_ok());
        // O to move, O slot assigned.
        let state = play(&state, 0);
        assert_eq!(
            apply_move(&state, 1, Some(7)),
            Err(MoveError::WrongTurn(Mark::O))
        );
    }

    #[test]
    fn test_rejected_move_leaves_game_unchanged() {
        let state = game("X        ", None, None);
        let before = state.clone();
        let _ = apply_move(&state, 0, None);
        assert_eq!(state, before);
        assert_eq!(*state.board(), decode("X        ").unwrap());
        assert_ne!(*state.board(), Board::new());
    }
}
