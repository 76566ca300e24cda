use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::{FieldError, ProjectId, RfiId, SessionContext};
use crate::domains::rfis::{
    actions, AddResponseInput, CreateRfiInput, RfiData, RfiResponseData, UpdateStatusInput,
};
use crate::kernel::{GatewayError, GatewayResult};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRfisQuery {
    pub project_id: Option<String>,
}

fn rfi_id(raw: &str) -> Result<RfiId, ApiError> {
    RfiId::parse(raw).map_err(|_| GatewayError::NotFound("RFI".to_string()).into())
}

/// `POST /api/rfis`
pub async fn create_rfi_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<CreateRfiInput>, JsonRejection>,
) -> Result<Json<GatewayResult<RfiData>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::invalid_body("body", e))?;
    let rfi = actions::create_rfi(input, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(rfi)))
}

/// `GET /api/rfis?projectId=`
pub async fn list_rfis_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ListRfisQuery>,
) -> Result<Json<GatewayResult<Vec<RfiData>>>, ApiError> {
    let project_id = match query.project_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(ProjectId::parse(raw).map_err(|_| {
            GatewayError::Validation(vec![FieldError {
                field: "projectId".into(),
                message: "Invalid project id".into(),
            }])
        })?),
    };
    let rfis = actions::list_rfis(project_id, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(rfis)))
}

/// `GET /api/rfis/:id`
pub async fn get_rfi_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<GatewayResult<RfiData>>, ApiError> {
    let rfi = actions::get_rfi(rfi_id(&id)?, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(rfi)))
}

/// `PATCH /api/rfis/:id/status`
pub async fn update_status_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusInput>, JsonRejection>,
) -> Result<Json<GatewayResult<RfiData>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::invalid_body("status", e))?;
    let rfi = actions::update_rfi_status(rfi_id(&id)?, input.status, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(rfi)))
}

/// `POST /api/rfis/:id/responses`
pub async fn add_response_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    body: Result<Json<AddResponseInput>, JsonRejection>,
) -> Result<Json<GatewayResult<RfiResponseData>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::invalid_body("body", e))?;
    let response = actions::add_response(rfi_id(&id)?, input, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(response)))
}

/// `DELETE /api/rfis/:id`
pub async fn delete_rfi_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<GatewayResult<Value>>, ApiError> {
    let deleted = actions::delete_rfi(rfi_id(&id)?, &session, &state.deps).await?;
    Ok(Json(GatewayResult::ok(json!({ "id": deleted }))))
}
