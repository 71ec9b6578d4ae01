//! Shared handler state.

use std::sync::Arc;

use crate::game_service::GameService;
use crate::leaderboard::Leaderboard;

/// State cloned into every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Players, games and moves.
    pub game_service: Arc<GameService>,
    /// Standings.
    pub leaderboard: Arc<Leaderboard>,
}

impl AppState {
    /// Bundles the services for the router.
    pub fn new(game_service: GameService, leaderboard: Leaderboard) -> Self {
        Self {
            game_service: Arc::new(game_service),
            leaderboard: Arc::new(leaderboard),
        }
    }
}
