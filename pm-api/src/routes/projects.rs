use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::models::{Project, ProjectStatus},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(name = "GET /projects", skip(app_state))]
async fn list_projects(State(app_state): State<AppState>) -> Json<Vec<Project>> {
    Json(app_state.store.snapshot().await.projects)
}

#[instrument(name = "GET /projects/:id", skip(app_state))]
async fn get_project(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    app_state
        .store
        .snapshot()
        .await
        .projects
        .into_iter()
        .find(|p| p.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("project not found: {}", id)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewProjectBody {
    name: String,
    #[serde(default)]
    status: Option<ProjectStatus>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    location_link: Option<String>,
}

#[instrument(name = "POST /projects", skip(app_state, body), fields(name = %body.name))]
async fn create_project(
    State(app_state): State<AppState>,
    Json(body): Json<NewProjectBody>,
) -> (StatusCode, Json<Project>) {
    let project = app_state
        .store
        .create_project(Project {
            name: body.name,
            status: body.status.unwrap_or_default(),
            start_date: body.start_date,
            end_date: body.end_date,
            notes: body.notes,
            location_link: body.location_link,
            ..Default::default()
        })
        .await;

    tracing::info!("created project {}", project.id);
    (StatusCode::CREATED, Json(project))
}

#[instrument(name = "PUT /projects/:id", skip(app_state, body))]
async fn update_project(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Project>,
) -> Result<Json<Project>, ApiError> {
    app_state
        .store
        .update_project(&id, body)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("project not found: {}", id)))
}

#[instrument(name = "DELETE /projects/:id", skip(app_state))]
async fn delete_project(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if app_state.store.delete_project(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("project not found: {}", id)))
    }
}
