use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

use crate::kernel::{RowQuery, Table};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: &'static str,
    backend: BackendHealth,
}

#[derive(Serialize)]
pub struct BackendHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Issues one cheap read against the hosted backend. Returns 200 OK when it
/// answers within five seconds, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state
            .deps
            .gateway
            .fetch_all::<Value>(Table::Projects, &RowQuery::all().limit(1)),
    )
    .await
    {
        Ok(Ok(_)) => BackendHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => BackendHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
        Err(_) => BackendHealth {
            status: "error".to_string(),
            error: Some("Backend timeout (>5s)".to_string()),
        },
    };

    let healthy = backend.status == "ok";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            backend,
        }),
    )
}
