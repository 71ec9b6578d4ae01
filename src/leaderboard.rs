//! Leaderboard derived from finished games.
//!
//! Every call rescans the finished games; nothing is cached. That keeps the
//! board exactly consistent with stored games but costs a full scan, which is
//! only acceptable while the game count stays small.

use std::collections::{BTreeMap, HashMap, HashSet};

use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::{GameRecord, GameRepository, Player};
use crate::error::GameError;
use crate::games::tictactoe::{GameStatus, Mark};

/// Upper bound on finished games read per computation.
pub const DEFAULT_SCAN_LIMIT: i64 = 10_000;

/// Points for a win.
pub const WIN_POINTS: u32 = 3;

/// Points for a draw.
pub const DRAW_POINTS: u32 = 1;

/// One player's standing.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct LeaderboardEntry {
    username: String,
    wins: u32,
    losses: u32,
    draws: u32,
    score: u32,
}

impl LeaderboardEntry {
    /// Creates an entry, deriving the score from the counts.
    pub fn new(username: String, wins: u32, losses: u32, draws: u32) -> Self {
        Self {
            username,
            wins,
            losses,
            draws,
            score: wins * WIN_POINTS + draws * DRAW_POINTS,
        }
    }
}

/// A finished game reduced to what the leaderboard needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedGame {
    /// Terminal status.
    pub status: GameStatus,
    /// Player holding X, if any.
    pub player_x_id: Option<i32>,
    /// Player holding O, if any.
    pub player_o_id: Option<i32>,
}

impl FinishedGame {
    fn player(&self, mark: Mark) -> Option<i32> {
        match mark {
            Mark::X => self.player_x_id,
            Mark::O => self.player_o_id,
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    wins: u32,
    losses: u32,
    draws: u32,
}

/// Folds finished games into entries sorted by username.
///
/// Ids missing from `usernames` are skipped for their side only.
/// In-progress games are ignored.
#[instrument(skip_all, fields(games = games.len(), players = usernames.len()))]
pub fn tally(games: &[FinishedGame], usernames: &HashMap<i32, String>) -> Vec<LeaderboardEntry> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut bump = |player_id: Option<i32>, update: fn(&mut Tally)| {
        if let Some(name) = player_id.and_then(|id| usernames.get(&id)) {
            update(tallies.entry(name.as_str()).or_default());
        }
    };

    for game in games {
        match game.status {
            GameStatus::Won(winner) => {
                bump(game.player(winner), |t| t.wins += 1);
                bump(game.player(winner.opponent()), |t| t.losses += 1);
            }
            GameStatus::Draw => {
                bump(game.player_x_id, |t| t.draws += 1);
                bump(game.player_o_id, |t| t.draws += 1);
            }
            GameStatus::InProgress => {}
        }
    }

    tallies
        .into_iter()
        .map(|(name, t)| LeaderboardEntry::new(name.to_string(), t.wins, t.losses, t.draws))
        .collect()
}

/// Computes standings from the store.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    repository: GameRepository,
    scan_limit: i64,
}

impl Leaderboard {
    /// Creates a leaderboard reading at most `scan_limit` finished games.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository, scan_limit: i64) -> Self {
        info!(scan_limit, "Creating Leaderboard");
        Self {
            repository,
            scan_limit,
        }
    }

    /// Rescans finished games and returns standings sorted by username.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Storage`] if the store fails.
    #[instrument(skip(self))]
    pub fn compute(&self) -> Result<Vec<LeaderboardEntry>, GameError> {
        let records = self.repository.finished_games(self.scan_limit)?;
        let games: Vec<FinishedGame> = records.iter().filter_map(finished_game).collect();

        let ids: HashSet<i32> = games
            .iter()
            .flat_map(|g| [g.player_x_id, g.player_o_id])
            .flatten()
            .collect();
        let ids: Vec<i32> = ids.into_iter().collect();
        let usernames: HashMap<i32, String> = self
            .repository
            .get_players(&ids)?
            .into_iter()
            .map(|p: Player| (*p.id(), p.username().clone()))
            .collect();

        if usernames.len() < ids.len() {
            debug!(
                unresolved = ids.len() - usernames.len(),
                "Some player ids no longer resolve"
            );
        }

        let entries = tally(&games, &usernames);
        info!(games = games.len(), entries = entries.len(), "Leaderboard computed");
        Ok(entries)
    }
}

fn finished_game(record: &GameRecord) -> Option<FinishedGame> {
    match record.parse_status() {
        Ok(status) => Some(FinishedGame {
            status,
            player_x_id: *record.player_x_id(),
            player_o_id: *record.player_o_id(),
        }),
        Err(e) => {
            warn!(game_id = record.id(), error = %e, "Skipping game with unreadable status");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(i32, &str)]) -> HashMap<i32, String> {
        pairs.iter().map(|(id, n)| (*id, n.to_string())).collect()
    }

    fn finished(status: GameStatus, x: Option<i32>, o: Option<i32>) -> FinishedGame {
        FinishedGame {
            status,
            player_x_id: x,
            player_o_id: o,
        }
    }

    #[test]
    fn test_win_and_draw() {
        let games = [
            finished(GameStatus::Won(Mark::X), Some(1), Some(2)),
            finished(GameStatus::Draw, Some(1), Some(2)),
        ];
        let entries = tally(&games, &names(&[(1, "bob"), (2, "alice")]));
        assert_eq!(
            entries,
            vec![
                LeaderboardEntry::new("alice".into(), 0, 1, 1),
                LeaderboardEntry::new("bob".into(), 1, 0, 1),
            ]
        );
        assert_eq!(*entries[0].score(), 1);
        assert_eq!(*entries[1].score(), 4);
    }

    #[test]
    fn test_o_win_counts_x_loss() {
        let games = [finished(GameStatus::Won(Mark::O), Some(1), Some(2))];
        let entries = tally(&games, &names(&[(1, "xavier"), (2, "olga")]));
        assert_eq!(entries[0], LeaderboardEntry::new("olga".into(), 1, 0, 0));
        assert_eq!(entries[1], LeaderboardEntry::new("xavier".into(), 0, 1, 0));
    }

    #[test]
    fn test_unresolved_side_skipped() {
        let games = [
            finished(GameStatus::Won(Mark::X), Some(1), Some(99)),
            finished(GameStatus::Draw, None, Some(1)),
        ];
        let entries = tally(&games, &names(&[(1, "carol")]));
        assert_eq!(entries, vec![LeaderboardEntry::new("carol".into(), 1, 0, 1)]);
    }

    #[test]
    fn test_in_progress_ignored() {
        let games = [finished(GameStatus::InProgress, Some(1), Some(2))];
        assert!(tally(&games, &names(&[(1, "a"), (2, "b")])).is_empty());
    }

    #[test]
    fn test_sorted_by_username_not_score() {
        let games = [
            finished(GameStatus::Won(Mark::X), Some(3), None),
            finished(GameStatus::Won(Mark::X), Some(3), None),
            finished(GameStatus::Draw, Some(1), None),
        ];
        let entries = tally(&games, &names(&[(1, "aaron"), (3, "zed")]));
        let order: Vec<&str> = entries.iter().map(|e| e.username().as_str()).collect();
        assert_eq!(order, vec!["aaron", "zed"]);
    }
}
