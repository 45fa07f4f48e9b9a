use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::{
    domain::{migrate_bundle, models::StateBundle, now_iso},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(export_data))
        .route("/import", post(import_data))
}

/// Downloadable snapshot in the backup-file shape.
#[instrument(name = "GET /export", skip(app_state))]
async fn export_data(State(app_state): State<AppState>) -> impl IntoResponse {
    let mut bundle = app_state.store.snapshot().await;
    bundle.export_date = Some(now_iso());

    let filename = format!(
        "construction-pm-backup-{}.json",
        Utc::now().format("%Y-%m-%d")
    );

    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        Json(bundle),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary {
    projects: usize,
    architects: usize,
    contractors: usize,
}

/// Replaces the whole state with an uploaded backup file. Missing arrays
/// default to empty; legacy investor/supervisor fields are migrated. The
/// replacement is a mutation, so it triggers a push.
#[instrument(name = "POST /import", skip(app_state, body))]
async fn import_data(
    State(app_state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Result<Json<ImportSummary>, ApiError> {
    if !body.is_object() {
        return Err(ApiError::bad_request("import must be a JSON object"));
    }

    migrate_bundle(&mut body);
    let bundle: StateBundle = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("invalid import file: {}", e)))?;

    let imported = app_state.store.replace_all(bundle).await;
    tracing::info!(
        "imported {} projects, {} architects, {} contractors",
        imported.projects.len(),
        imported.architects.len(),
        imported.contractors.len()
    );

    Ok(Json(ImportSummary {
        projects: imported.projects.len(),
        architects: imported.architects.len(),
        contractors: imported.contractors.len(),
    }))
}
