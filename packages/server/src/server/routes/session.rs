use axum::{extract::Extension, Json};

use crate::common::SessionContext;
use crate::domains::users::SessionData;
use crate::kernel::GatewayResult;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `GET /api/session` - who the caller is and what they may do.
pub async fn session_handler(
    Extension(session): Extension<SessionContext>,
) -> Json<GatewayResult<SessionData>> {
    Json(GatewayResult::ok(SessionData::from(&session)))
}

/// `DELETE /api/session` - sign-out. Drops the caller's notices and
/// reports the cleared session.
pub async fn sign_out_handler(
    Extension(state): Extension<AppState>,
    Extension(mut session): Extension<SessionContext>,
) -> Result<Json<GatewayResult<SessionData>>, ApiError> {
    let user_id = session.require_user()?.id;
    state.deps.notices.clear(user_id).await;
    session.clear();
    tracing::info!(user_id = %user_id, "Signed out");
    Ok(Json(GatewayResult::ok(SessionData::from(&session))))
}
