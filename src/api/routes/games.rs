//! Games, moves and move history.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tracing::{debug, info, instrument, warn};

use crate::api::extract::{JsonBody, PathParam, QueryParams};
use crate::api::{
    ApiError, AppState, CreateGameRequest, GameView, MoveView, Pagination, SubmitMoveRequest,
    blocking,
};
use crate::error::GameError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/moves", post(submit_move).get(game_history))
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<AppState>,
    payload: Option<JsonBody<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let payload = payload.map(|JsonBody(p)| p).unwrap_or_default();
    let service = state.game_service.clone();
    let game =
        blocking(move || service.create_game(payload.player_x_id, payload.player_o_id)).await?;
    info!(game_id = game.id(), "Game started");
    Ok((StatusCode::CREATED, Json(GameView::from(&game))))
}

#[instrument(skip(state))]
async fn list_games(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let (limit, offset) = page
        .resolve()
        .ok_or_else(|| ApiError::BadRequest("limit must be 1-1000 and offset >= 0".into()))?;
    let service = state.game_service.clone();
    let games = blocking(move || service.list_games(limit, offset)).await?;
    debug!(count = games.len(), "Games listed");
    Ok(Json(games.iter().map(GameView::from).collect()))
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<GameView>, ApiError> {
    let service = state.game_service.clone();
    let game = blocking(move || service.get_game(id)).await?;
    Ok(Json(GameView::from(&game)))
}

#[instrument(skip(state))]
async fn submit_move(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<SubmitMoveRequest>,
) -> Result<Json<GameView>, ApiError> {
    let service = state.game_service.clone();
    let game = blocking(move || service.submit_move(id, payload.position, payload.player_id))
        .await
        .inspect_err(|e| {
            if !e.status().is_server_error() {
                debug!(game_id = id, error = %e, "Move refused");
            }
        })?;
    Ok(Json(GameView::from(&game)))
}

#[instrument(skip(state))]
async fn game_history(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Vec<MoveView>>, ApiError> {
    let service = state.game_service.clone();
    let moves = blocking(move || service.history(id)).await?;
    moves
        .iter()
        .map(MoveView::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
        .map_err(|e| {
            warn!(game_id = id, error = %e, "Stored move unreadable");
            ApiError::Game(GameError::Storage(e))
        })
}
