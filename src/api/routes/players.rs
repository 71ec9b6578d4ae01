//! Player registration and lookup.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::{debug, info, instrument};

use crate::api::extract::{JsonBody, PathParam, QueryParams};
use crate::api::{ApiError, AppState, CreatePlayerRequest, Pagination, blocking};
use crate::db::Player;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", post(create_player).get(list_players))
        .route("/players/{id}", get(get_player).delete(delete_player))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
async fn create_player(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let service = state.game_service.clone();
    let player =
        blocking(move || service.create_player(payload.username, payload.display_name)).await?;
    info!(player_id = player.id(), "Player registered");
    Ok((StatusCode::CREATED, Json(player)))
}

#[instrument(skip(state))]
async fn list_players(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let (limit, offset) = page
        .resolve()
        .ok_or_else(|| ApiError::BadRequest("limit must be 1-1000 and offset >= 0".into()))?;
    let service = state.game_service.clone();
    let players = blocking(move || service.list_players(limit, offset)).await?;
    debug!(count = players.len(), "Players listed");
    Ok(Json(players))
}

#[instrument(skip(state))]
async fn get_player(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Player>, ApiError> {
    let service = state.game_service.clone();
    blocking(move || service.get_player(id)).await.map(Json)
}

#[instrument(skip(state))]
async fn delete_player(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, ApiError> {
    let service = state.game_service.clone();
    blocking(move || service.delete_player(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
