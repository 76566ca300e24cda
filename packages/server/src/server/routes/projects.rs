use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};

use crate::common::SessionContext;
use crate::domains::projects::{actions, CreateProjectInput, ProjectData};
use crate::kernel::GatewayResult;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `POST /api/projects`
pub async fn create_project_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<CreateProjectInput>, JsonRejection>,
) -> Result<Json<GatewayResult<ProjectData>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::invalid_body("body", e))?;
    let project = actions::create_project(input, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(project.into())))
}

/// `GET /api/projects` - a bare array, newest first.
pub async fn list_projects_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<ProjectData>>, ApiError> {
    let projects = actions::list_projects(&session, &state.deps).await?;
    Ok(Json(projects.into_iter().map(ProjectData::from).collect()))
}
