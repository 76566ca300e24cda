use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::common::SessionContext;
use crate::domains::export::{self, ExportError};
use crate::kernel::PdfPreview;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Serialize)]
pub struct PreviewsResponse {
    previews: Vec<PdfPreview>,
}

/// `POST /api/export/pdf-previews` with body `{ "rfis": [...] }`
pub async fn pdf_previews_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PreviewsResponse>, ApiError> {
    let rfis = match body {
        Ok(Json(Value::Object(mut body))) => match body.remove("rfis") {
            Some(Value::Array(rfis)) => rfis,
            _ => return Err(invalid_request()),
        },
        _ => return Err(invalid_request()),
    };

    match export::render_previews(&rfis, &session, &state.deps).await {
        Ok(previews) => Ok(Json(PreviewsResponse { previews })),
        Err(ExportError::Permission(err)) => Err(err.into()),
        Err(ExportError::Render(_)) => Err(ApiError::message(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate PDF previews",
        )),
    }
}

fn invalid_request() -> ApiError {
    ApiError::bad_request("Invalid request: RFIs array is required")
}
