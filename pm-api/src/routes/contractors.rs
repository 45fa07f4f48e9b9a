use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{domain::models::Contractor, routes::ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contractors).post(create_contractor))
        .route(
            "/:id",
            get(get_contractor)
                .put(update_contractor)
                .delete(delete_contractor),
        )
}

#[instrument(name = "GET /contractors", skip(app_state))]
async fn list_contractors(State(app_state): State<AppState>) -> Json<Vec<Contractor>> {
    Json(app_state.store.snapshot().await.contractors)
}

#[instrument(name = "GET /contractors/:id", skip(app_state))]
async fn get_contractor(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Contractor>, ApiError> {
    app_state
        .store
        .snapshot()
        .await
        .contractors
        .into_iter()
        .find(|c| c.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("contractor not found: {}", id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewContractorBody {
    name: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    specialty: String,
}

#[instrument(name = "POST /contractors", skip(app_state, body), fields(name = %body.name))]
async fn create_contractor(
    State(app_state): State<AppState>,
    Json(body): Json<NewContractorBody>,
) -> (StatusCode, Json<Contractor>) {
    let contractor = app_state
        .store
        .create_contractor(Contractor {
            name: body.name,
            company: body.company,
            email: body.email,
            phone: body.phone,
            specialty: body.specialty,
            ..Default::default()
        })
        .await;

    tracing::info!("created contractor {}", contractor.id);
    (StatusCode::CREATED, Json(contractor))
}

#[instrument(name = "PUT /contractors/:id", skip(app_state, body))]
async fn update_contractor(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Contractor>,
) -> Result<Json<Contractor>, ApiError> {
    app_state
        .store
        .update_contractor(&id, body)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("contractor not found: {}", id)))
}

#[instrument(name = "DELETE /contractors/:id", skip(app_state))]
async fn delete_contractor(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if app_state.store.delete_contractor(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("contractor not found: {}", id)))
    }
}
