//! Core domain types for tic-tac-toe.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Number of cells on a 3x3 board.
pub const BOARD_LEN: usize = 9;

/// Mark a player places on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// X (moves first).
    X,
    /// O (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Single-character form used in storage.
    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }

    /// Parses the single-character storage form.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Mark::X),
            'O' => Some(Mark::O),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    Empty,
    /// Holds a mark.
    Marked(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Marked(mark) => Some(mark),
        }
    }

    /// Checks if the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// 3x3 board in row-major order (0 = top-left, 8 = bottom-right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; BOARD_LEN],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; BOARD_LEN],
        }
    }

    /// Creates a board from nine cells.
    pub fn from_cells(cells: [Cell; BOARD_LEN]) -> Self {
        Self { cells }
    }

    /// Gets the cell at the given position (0-8).
    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Returns a copy of the board with `mark` placed at `pos`.
    ///
    /// Callers validate `pos` beforehand; an out-of-range position leaves the
    /// board unchanged.
    pub(crate) fn with_mark(mut self, pos: usize, mark: Mark) -> Self {
        if let Some(cell) = self.cells.get_mut(pos) {
            *cell = Cell::Marked(mark);
        }
        self
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; BOARD_LEN] {
        &self.cells
    }

    /// Counts cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == Cell::Marked(mark))
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Status of a game, always derived from its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Moves are still accepted.
    InProgress,
    /// Three in a row for the given mark.
    Won(Mark),
    /// Full board, no winner.
    Draw,
}

impl GameStatus {
    /// Returns the winning mark, present iff the game was won.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            GameStatus::Won(mark) => Some(*mark),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }

    /// Checks if no further moves are accepted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// In-memory view of one game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameState {
    id: i32,
    board: Board,
    status: GameStatus,
    player_x_id: Option<i32>,
    player_o_id: Option<i32>,
    started_at: NaiveDateTime,
    finished_at: Option<NaiveDateTime>,
}

impl GameState {
    /// Assembles a game from its parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i32,
        board: Board,
        status: GameStatus,
        player_x_id: Option<i32>,
        player_o_id: Option<i32>,
        started_at: NaiveDateTime,
        finished_at: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id,
            board,
            status,
            player_x_id,
            player_o_id,
            started_at,
            finished_at,
        }
    }

    /// Returns the winning mark, if any.
    pub fn winner(&self) -> Option<Mark> {
        self.status.winner()
    }

    /// Returns the player id holding the slot for `mark`.
    pub fn slot(&self, mark: Mark) -> Option<i32> {
        match mark {
            Mark::X => self.player_x_id,
            Mark::O => self.player_o_id,
        }
    }

    /// Checks if any player slot is assigned.
    pub fn has_assigned_players(&self) -> bool {
        self.player_x_id.is_some() || self.player_o_id.is_some()
    }

    /// Replaces board and status after an accepted move.
    pub(crate) fn advance(mut self, board: Board, status: GameStatus) -> Self {
        self.board = board;
        self.status = status;
        self
    }
}
