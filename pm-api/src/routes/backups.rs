use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    domain::{BackupEntry, BackupService, BackupSlot},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_backups).post(create_backup))
        .route("/restore", post(restore_backup))
}

fn backup_service(app_state: &AppState) -> Result<Arc<BackupService>, ApiError> {
    app_state.backups.clone().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "remote storage is not configured",
        )
    })
}

#[instrument(name = "GET /backups", skip(app_state))]
async fn list_backups(State(app_state): State<AppState>) -> Result<Json<Vec<BackupEntry>>, ApiError> {
    let backups = backup_service(&app_state)?;
    Ok(Json(backups.list_backups().await?))
}

#[instrument(name = "POST /backups", skip(app_state))]
async fn create_backup(State(app_state): State<AppState>) -> Result<Json<BackupEntry>, ApiError> {
    let backups = backup_service(&app_state)?;
    let entry = backups.create_backup().await?;
    tracing::info!("created backup at {:?}", entry.timestamp);
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreBackupBody {
    slot: BackupSlot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestoreSummary {
    projects: usize,
    architects: usize,
    contractors: usize,
}

#[instrument(name = "POST /backups/restore", skip(app_state))]
async fn restore_backup(
    State(app_state): State<AppState>,
    Json(body): Json<RestoreBackupBody>,
) -> Result<Json<RestoreSummary>, ApiError> {
    let backups = backup_service(&app_state)?;
    let restored = backups.restore_backup(body.slot).await?;

    tracing::info!("restored backup from {:?}", body.slot);
    Ok(Json(RestoreSummary {
        projects: restored.projects.len(),
        architects: restored.architects.len(),
        contractors: restored.contractors.len(),
    }))
}
