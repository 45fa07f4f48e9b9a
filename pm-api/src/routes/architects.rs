use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{domain::models::Architect, routes::ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_architects).post(create_architect))
        .route(
            "/:id",
            get(get_architect)
                .put(update_architect)
                .delete(delete_architect),
        )
}

#[instrument(name = "GET /architects", skip(app_state))]
async fn list_architects(State(app_state): State<AppState>) -> Json<Vec<Architect>> {
    Json(app_state.store.snapshot().await.architects)
}

#[instrument(name = "GET /architects/:id", skip(app_state))]
async fn get_architect(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Architect>, ApiError> {
    app_state
        .store
        .snapshot()
        .await
        .architects
        .into_iter()
        .find(|a| a.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("architect not found: {}", id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewArchitectBody {
    name: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

#[instrument(name = "POST /architects", skip(app_state, body), fields(name = %body.name))]
async fn create_architect(
    State(app_state): State<AppState>,
    Json(body): Json<NewArchitectBody>,
) -> (StatusCode, Json<Architect>) {
    let architect = app_state
        .store
        .create_architect(Architect {
            name: body.name,
            company: body.company,
            email: body.email,
            phone: body.phone,
            ..Default::default()
        })
        .await;

    tracing::info!("created architect {}", architect.id);
    (StatusCode::CREATED, Json(architect))
}

#[instrument(name = "PUT /architects/:id", skip(app_state, body))]
async fn update_architect(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Architect>,
) -> Result<Json<Architect>, ApiError> {
    app_state
        .store
        .update_architect(&id, body)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("architect not found: {}", id)))
}

#[instrument(name = "DELETE /architects/:id", skip(app_state))]
async fn delete_architect(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if app_state.store.delete_architect(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("architect not found: {}", id)))
    }
}
