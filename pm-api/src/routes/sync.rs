use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{domain::sync::SyncState, routes::ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_sync_state).post(trigger_sync))
}

#[instrument(name = "GET /sync", skip(app_state))]
async fn get_sync_state(State(app_state): State<AppState>) -> Json<SyncState> {
    Json(app_state.orchestrator.state().await)
}

/// Manual sync: the only retry mechanism besides the next mutation. The
/// push itself runs on the orchestrator loop; this returns immediately.
#[instrument(name = "POST /sync", skip(app_state))]
async fn trigger_sync(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<SyncState>), ApiError> {
    if !app_state.orchestrator.remote_enabled() {
        return Err(ApiError::bad_request("remote sync is not configured"));
    }

    if !app_state.request_sync().await {
        return Err(ApiError::internal("sync worker is not running"));
    }

    Ok((StatusCode::ACCEPTED, Json(app_state.orchestrator.state().await)))
}
