//! Game and player business logic layer.
//!
//! [`GameService`] ties the pure rule engine to the store: it loads a game,
//! asks [`apply_move`] whether a move is legal, and commits the move together
//! with the new game snapshot in one transaction.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::db::{
    DbErrorKind, GameRecord, GameRepository, GameUpdate, MoveRecord, NewGame, NewMove, NewPlayer,
    Player, status_to_db, winner_to_db,
};
use crate::error::GameError;
use crate::games::tictactoe::{
    Board, GameState, GameStatus, apply_move, classify, decode, encode_board,
};

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 50;

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Service layer for players, games and moves.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: GameRepository,
}

impl GameService {
    /// Creates a new game service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository) -> Self {
        info!("Creating GameService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Registers a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidInput`] for an empty or overlong username
    /// or display name, and [`GameError::UsernameTaken`] if the username is
    /// in use.
    #[instrument(skip(self))]
    pub fn create_player(
        &self,
        username: String,
        display_name: Option<String>,
    ) -> Result<Player, GameError> {
        let len = username.chars().count();
        if len == 0 || len > MAX_USERNAME_LEN {
            return Err(GameError::InvalidInput(format!(
                "username must be 1-{} characters",
                MAX_USERNAME_LEN
            )));
        }
        if display_name
            .as_ref()
            .is_some_and(|name| name.chars().count() > MAX_DISPLAY_NAME_LEN)
        {
            return Err(GameError::InvalidInput(format!(
                "display name must be at most {} characters",
                MAX_DISPLAY_NAME_LEN
            )));
        }

        self.repository
            .create_player(NewPlayer::new(username.clone(), display_name))
            .map_err(|e| {
                if e.is_unique_violation() {
                    info!(username = %username, "Username already taken");
                    GameError::UsernameTaken(username)
                } else {
                    GameError::Storage(e)
                }
            })
    }

    /// Gets a player by id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if no player has this id.
    #[instrument(skip(self))]
    pub fn get_player(&self, player_id: i32) -> Result<Player, GameError> {
        self.repository
            .get_player(player_id)?
            .ok_or(GameError::PlayerNotFound(player_id))
    }

    /// Lists players in creation order.
    #[instrument(skip(self))]
    pub fn list_players(&self, limit: i64, offset: i64) -> Result<Vec<Player>, GameError> {
        Ok(self.repository.list_players(limit, offset)?)
    }

    /// Deletes a player, leaving their games and moves unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if no player has this id.
    #[instrument(skip(self))]
    pub fn delete_player(&self, player_id: i32) -> Result<(), GameError> {
        if self.repository.delete_player(player_id)? {
            info!(player_id, "Player deleted");
            Ok(())
        } else {
            Err(GameError::PlayerNotFound(player_id))
        }
    }

    /// Starts a game with an empty board and optional player slots.
    ///
    /// The same player may hold both slots.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PlayerNotFound`] if a slot names an unknown player.
    #[instrument(skip(self))]
    pub fn create_game(
        &self,
        player_x_id: Option<i32>,
        player_o_id: Option<i32>,
    ) -> Result<GameState, GameError> {
        for player_id in [player_x_id, player_o_id].into_iter().flatten() {
            self.get_player(player_id)?;
        }

        let new_game = NewGame::new(
            encode_board(&Board::new()),
            status_to_db(GameStatus::InProgress).to_string(),
            player_x_id,
            player_o_id,
        );
        let record = self.repository.create_game(new_game)?;
        load_state(&record)
    }

    /// Gets the current state of a game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] if no game has this id.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<GameState, GameError> {
        let record = self
            .repository
            .get_game(game_id)?
            .ok_or(GameError::GameNotFound(game_id))?;
        load_state(&record)
    }

    /// Lists games, newest first.
    #[instrument(skip(self))]
    pub fn list_games(&self, limit: i64, offset: i64) -> Result<Vec<GameState>, GameError> {
        self.repository
            .list_games(limit, offset)?
            .iter()
            .map(load_state)
            .collect()
    }

    /// Returns a game's moves, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`] if no game has this id.
    #[instrument(skip(self))]
    pub fn history(&self, game_id: i32) -> Result<Vec<MoveRecord>, GameError> {
        if self.repository.get_game(game_id)?.is_none() {
            return Err(GameError::GameNotFound(game_id));
        }
        Ok(self.repository.list_moves(game_id)?)
    }

    /// Plays one move end to end.
    ///
    /// Nothing is written unless the move is legal. The move row and the
    /// new board, status, winner and finish time are committed together, and
    /// only if the game still holds the board that was validated.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameNotFound`] if no game has this id.
    /// - [`GameError::Move`] if the rules or turn order reject the move.
    /// - [`GameError::PersistenceConflict`] if another move landed first.
    /// - [`GameError::PlayerNotFound`] if `acting_player` names no player.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        game_id: i32,
        position: i32,
        acting_player: Option<i32>,
    ) -> Result<GameState, GameError> {
        let record = self
            .repository
            .get_game(game_id)?
            .ok_or(GameError::GameNotFound(game_id))?;
        let state = load_state(&record)?;

        let applied = apply_move(&state, position, acting_player).inspect_err(|e| {
            debug!(error = %e, "Move rejected");
        })?;

        let status = *applied.state().status();
        let finished_at = status.is_terminal().then(|| Utc::now().naive_utc());
        let update = GameUpdate::new(
            encode_board(applied.state().board()),
            status_to_db(status).to_string(),
            winner_to_db(status),
            finished_at,
        );
        let new_move = NewMove::new(
            game_id,
            acting_player,
            *applied.position() as i32,
            applied.mark().to_string(),
        );

        let (committed, recorded) = self
            .repository
            .commit_move(game_id, record.board(), update, new_move)
            .map_err(|e| match (e.kind(), acting_player) {
                (DbErrorKind::Conflict(_), _) => {
                    warn!(game_id, "Concurrent move detected");
                    GameError::PersistenceConflict(game_id)
                }
                (DbErrorKind::ForeignKeyViolation(_), Some(player_id)) => {
                    GameError::PlayerNotFound(player_id)
                }
                _ => GameError::Storage(e),
            })?;

        info!(
            game_id,
            move_id = recorded.id(),
            position = recorded.position(),
            mark = %recorded.mark(),
            status = ?status,
            "Move accepted"
        );
        load_state(&committed)
    }
}

/// Rebuilds a [`GameState`] from a stored row, checking its integrity.
///
/// # Errors
///
/// Returns [`GameError::MalformedBoard`] if the board cannot be decoded and
/// [`GameError::InconsistentState`] if the stored status, winner or finish
/// time disagrees with the board.
#[instrument(skip(record), fields(game_id = record.id()))]
pub fn load_state(record: &GameRecord) -> Result<GameState, GameError> {
    let game_id = *record.id();
    let board = decode(record.board())
        .map_err(|source| GameError::MalformedBoard { game_id, source })?;

    let status = record.parse_status().map_err(|e| {
        warn!(error = %e, "Stored status unreadable");
        GameError::InconsistentState(game_id)
    })?;

    if classify(&board) != status || status.is_terminal() != record.finished_at().is_some() {
        warn!(status = ?status, "Stored status disagrees with board");
        return Err(GameError::InconsistentState(game_id));
    }

    Ok(GameState::new(
        game_id,
        board,
        status,
        *record.player_x_id(),
        *record.player_o_id(),
        *record.started_at(),
        *record.finished_at(),
    ))
}
