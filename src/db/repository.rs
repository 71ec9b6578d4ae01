//! Database repository for players, games and moves.

use std::path::Path;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{STATUS_IN_PROGRESS, TERMINAL_STATUSES};
use crate::db::{
    DbError, DbErrorKind, GameRecord, GameUpdate, MoveRecord, NewGame, NewMove, NewPlayer,
    Player, schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Handle to the SQLite store.
///
/// Opened once at startup and passed down explicitly. Every operation opens
/// its own connection, so the handle is cheap to clone and share between
/// request tasks.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
    busy_timeout: Duration,
}

impl GameRepository {
    /// Opens the store at `db_path`, creating the parent directory and
    /// applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the directory, connection or migrations fail.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String, busy_timeout: Duration) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening GameRepository");

        if let Some(parent) = Path::new(&db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::new(DbErrorKind::Connection(format!(
                    "Failed to create '{}': {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let repo = Self {
            db_path,
            busy_timeout,
        };
        let mut conn = repo.connection()?;
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration(e.to_string())))?;
        info!(applied = applied.len(), "Migrations applied");

        Ok(repo)
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a connection with foreign keys and the busy timeout set.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(DbErrorKind::Connection(format!(
                "Failed to connect to '{}': {}",
                self.db_path, e
            )))
        })?;
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))?;
        Ok(conn)
    }

    /// Creates a new player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::UniqueViolation`] if the
    /// username is taken.
    #[instrument(skip(self, player), fields(username = %player.username()))]
    pub fn create_player(&self, player: NewPlayer) -> Result<Player, DbError> {
        debug!("Creating player");
        let mut conn = self.connection()?;

        let player = diesel::insert_into(schema::players::table)
            .values(&player)
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), username = %player.username(), "Player created");
        Ok(player)
    }

    /// Gets a player by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player(&self, player_id: i32) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .find(player_id)
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = player.is_some(), "Player lookup");
        Ok(player)
    }

    /// Gets a player by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_username(&self, username: &str) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::username.eq(username))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = player.is_some(), "Player lookup by username");
        Ok(player)
    }

    /// Gets every player whose id is in `ids`. Unknown ids are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn get_players(&self, ids: &[i32]) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;
        let players = schema::players::table
            .filter(schema::players::id.eq_any(ids.to_vec()))
            .select(Player::as_select())
            .load(&mut conn)?;
        debug!(found = players.len(), "Players loaded by id");
        Ok(players)
    }

    /// Lists players in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_players(&self, limit: i64, offset: i64) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;
        let players = schema::players::table
            .order(schema::players::id.asc())
            .limit(limit)
            .offset(offset)
            .select(Player::as_select())
            .load(&mut conn)?;
        info!(count = players.len(), "Players loaded");
        Ok(players)
    }

    /// Deletes a player. Game slots and moves referencing the player are
    /// set to NULL. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_player(&self, player_id: i32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let deleted =
            diesel::delete(schema::players::table.find(player_id)).execute(&mut conn)?;
        info!(deleted, "Player delete executed");
        Ok(deleted > 0)
    }

    /// Creates a new game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs, including a foreign key
    /// violation for an unknown player slot.
    #[instrument(skip(self, game), fields(player_x_id = ?game.player_x_id(), player_o_id = ?game.player_o_id()))]
    pub fn create_game(&self, game: NewGame) -> Result<GameRecord, DbError> {
        debug!("Creating game");
        let mut conn = self.connection()?;

        let game = diesel::insert_into(schema::games::table)
            .values(&game)
            .returning(GameRecord::as_returning())
            .get_result(&mut conn)?;

        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let game = schema::games::table
            .find(game_id)
            .select(GameRecord::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = game.is_some(), "Game lookup");
        Ok(game)
    }

    /// Lists games, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_games(&self, limit: i64, offset: i64) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .order(schema::games::id.desc())
            .limit(limit)
            .offset(offset)
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        info!(count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Loads up to `limit` finished games in creation order.
    ///
    /// Logs a warning when more finished games exist than were loaded.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn finished_games(&self, limit: i64) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let mut games = schema::games::table
            .filter(schema::games::status.eq_any(TERMINAL_STATUSES.to_vec()))
            .order(schema::games::id.asc())
            .limit(limit.saturating_add(1))
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        let cap = usize::try_from(limit).unwrap_or(0);
        if games.len() > cap {
            games.truncate(cap);
            warn!(limit, "Finished game scan hit its cap");
        }
        info!(count = games.len(), "Finished games loaded");
        Ok(games)
    }

    /// Lists a game's moves in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_moves(&self, game_id: i32) -> Result<Vec<MoveRecord>, DbError> {
        let mut conn = self.connection()?;
        let moves = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .order(schema::moves::id.asc())
            .select(MoveRecord::as_select())
            .load(&mut conn)?;
        debug!(count = moves.len(), "Moves loaded");
        Ok(moves)
    }

    /// Atomically records a move and the game snapshot it produced.
    ///
    /// Runs in an `IMMEDIATE` transaction. The game row is only updated if it
    /// is still in progress with `expected_board`; otherwise nothing is
    /// written and a [`DbErrorKind::Conflict`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on conflict or if either write fails; in both cases
    /// the transaction is rolled back.
    #[instrument(skip(self, update, new_move), fields(position = new_move.position(), mark = %new_move.mark()))]
    pub fn commit_move(
        &self,
        game_id: i32,
        expected_board: &str,
        update: GameUpdate,
        new_move: NewMove,
    ) -> Result<(GameRecord, MoveRecord), DbError> {
        debug!("Committing move");
        let mut conn = self.connection()?;

        let committed = conn.immediate_transaction::<_, DbError, _>(|conn| {
            use schema::games::dsl;

            let game = diesel::update(
                dsl::games
                    .filter(dsl::id.eq(game_id))
                    .filter(dsl::board.eq(expected_board))
                    .filter(dsl::status.eq(STATUS_IN_PROGRESS)),
            )
            .set((
                dsl::board.eq(update.board()),
                dsl::status.eq(update.status()),
                dsl::winner.eq(update.winner().as_deref()),
                dsl::finished_at.eq(*update.finished_at()),
            ))
            .returning(GameRecord::as_returning())
            .get_result(conn)
            .optional()?
            .ok_or_else(|| {
                DbError::conflict(format!("game {} changed since it was read", game_id))
            })?;

            let recorded = diesel::insert_into(schema::moves::table)
                .values(&new_move)
                .returning(MoveRecord::as_returning())
                .get_result(conn)?;

            Ok((game, recorded))
        });

        match &committed {
            Ok((game, recorded)) => info!(
                game_id = game.id(),
                move_id = recorded.id(),
                status = %game.status(),
                "Move committed"
            ),
            Err(e) => warn!(error = %e, "Move commit rolled back"),
        }
        committed
    }
}
