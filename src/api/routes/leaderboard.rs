//! Standings derived from finished games.

use axum::{Json, Router, extract::State, routing::get};
use tracing::{debug, instrument};

use crate::api::{ApiError, AppState, blocking};
use crate::leaderboard::LeaderboardEntry;

pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

#[instrument(skip(state))]
async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let leaderboard = state.leaderboard.clone();
    let entries = blocking(move || leaderboard.compute()).await?;
    debug!(entries = entries.len(), "Leaderboard served");
    Ok(Json(entries))
}
