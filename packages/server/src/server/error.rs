//! HTTP error responses.
//!
//! Every failure leaves a handler as an `ApiError`: a status code plus a JSON
//! body. Gateway errors keep the uniform `{ success, error, details }` shape
//! with a machine-readable `code` added.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::common::{AuthError, FieldError};
use crate::kernel::{BackendError, GatewayError, GatewayResult};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    /// Plain `{ "error": message }` body.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    /// Validation failure for a JSON body that did not deserialize. The field
    /// is taken from the rejection when it names one.
    pub fn invalid_body(fallback_field: &str, rejection: JsonRejection) -> Self {
        let error = body_field_error(&rejection.body_text(), fallback_field);
        GatewayError::Validation(vec![error]).into()
    }

    pub fn internal() -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

// Data errors read "<path>: <reason> at line L column C".
fn body_field_error(text: &str, fallback_field: &str) -> FieldError {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    let detail = detail.split(" at line ").next().unwrap_or(detail);

    let (field, message) = match detail.split_once(": ") {
        Some((path, reason)) if !path.is_empty() && !path.contains(' ') => {
            (path.to_string(), reason.to_string())
        }
        _ => {
            let missing = detail
                .strip_prefix("missing field `")
                .and_then(|rest| rest.split('`').next());
            match missing {
                Some(name) => (name.to_string(), "Field is required".to_string()),
                None => (fallback_field.to_string(), detail.to_string()),
            }
        }
    };
    FieldError { field, message }
}

/// Status and code for each gateway failure kind.
pub fn classify(err: &GatewayError) -> (StatusCode, &'static str) {
    match err {
        GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
        GatewayError::Permission(AuthError::AuthenticationRequired) => {
            (StatusCode::UNAUTHORIZED, "authentication_required")
        }
        GatewayError::Permission(AuthError::RolePending) => (StatusCode::FORBIDDEN, "role_pending"),
        GatewayError::Permission(AuthError::PermissionDenied(_)) => {
            (StatusCode::FORBIDDEN, "permission_denied")
        }
        GatewayError::Transition(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_transition"),
        GatewayError::NoOp(_) => (StatusCode::CONFLICT, "no_op"),
        GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        GatewayError::Backend(BackendError::Conflict(_)) => (StatusCode::CONFLICT, "conflict"),
        GatewayError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "backend_error"),
        GatewayError::Network(_) => (StatusCode::SERVICE_UNAVAILABLE, "network_error"),
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let (status, code) = classify(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, code, "Request failed");
        } else {
            tracing::debug!(error = %err, code, "Request rejected");
        }

        let mut body = serde_json::to_value(GatewayResult::<()>::failed(&err))
            .unwrap_or_else(|_| json!({ "success": false }));
        if let Some(object) = body.as_object_mut() {
            object.insert("code".into(), Value::String(code.into()));
        }
        Self { status, body }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        GatewayError::Permission(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
