use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use tracing::{error, warn};

use crate::common::SessionContext;
use crate::domains::users::{actions, InviteUserInput, UserData};
use crate::kernel::{BackendError, GatewayError, GatewayResult};
use crate::server::app::AppState;
use crate::server::error::{classify, ApiError};

const MISSING_FIELDS: &str = "Missing required fields";

/// `POST /api/admin/invite-user`
///
/// Keeps the plain `{ "error": ... }` body its clients expect:
/// - 400 "Missing required fields" when any field is absent or blank
/// - 400 with the failure text when the invitation itself is refused
/// - 500 "Internal server error" for anything unexpected
pub async fn invite_user_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<InviteUserInput>, JsonRejection>,
) -> Result<Json<GatewayResult<UserData>>, ApiError> {
    let Ok(Json(input)) = body else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };
    if !input.missing_fields().is_empty() {
        warn!(missing = ?input.missing_fields(), "Invite rejected");
        return Err(ApiError::bad_request(MISSING_FIELDS));
    }

    match actions::invite_user(input, &session, &state.deps).await {
        Ok(user) => Ok(Json(GatewayResult::ok(user.into()))),
        Err(err) => Err(invite_error(err)),
    }
}

fn invite_error(err: GatewayError) -> ApiError {
    match &err {
        GatewayError::Permission(_) => err.into(),
        GatewayError::Validation(fields) => {
            let message = fields
                .first()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| MISSING_FIELDS.to_string());
            ApiError::bad_request(message)
        }
        GatewayError::NotFound(_) | GatewayError::Backend(BackendError::Rejected { .. }) => {
            ApiError::bad_request(err.user_message())
        }
        _ => {
            let (status, code) = classify(&err);
            error!(error = %err, code, %status, "Invite failed unexpectedly");
            ApiError::internal()
        }
    }
}
