//! HTTP API.
//!
//! Handlers translate JSON requests into [`GameService`](crate::GameService)
//! and [`Leaderboard`](crate::Leaderboard) calls. Store calls block, so they
//! run on tokio's blocking pool.

mod error;
mod extract;
mod routes;
mod state;
mod views;

pub use error::{ApiError, ErrorBody};
pub use state::AppState;
pub use views::{
    CreateGameRequest, CreatePlayerRequest, DEFAULT_PAGE_LIMIT, GameView, HealthResponse,
    MAX_PAGE_LIMIT, MoveView, Pagination, SubmitMoveRequest,
};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::error::GameError;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::players::routes())
        .merge(routes::games::routes())
        .merge(routes::leaderboard::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the API on `listener` until ctrl-c.
///
/// # Errors
///
/// Returns an I/O error if the server fails.
#[instrument(skip_all)]
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    info!(addr = ?listener.local_addr().ok(), "Serving HTTP API");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}

/// Runs a blocking service call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, GameError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
}
