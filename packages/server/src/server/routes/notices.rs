use axum::{
    extract::{Extension, Path},
    Json,
};
use serde_json::{json, Value};

use crate::common::{NoticeId, SessionContext};
use crate::kernel::{GatewayError, GatewayResult, Notice};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `GET /api/notices` - the caller's live notices, oldest first.
pub async fn list_notices_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<GatewayResult<Vec<Notice>>>, ApiError> {
    let user = session.require_user()?;
    Ok(Json(GatewayResult::ok(state.deps.notices.list(user.id).await)))
}

/// `DELETE /api/notices/:id` - dismiss early and cancel the timer.
pub async fn dismiss_notice_handler(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<GatewayResult<Value>>, ApiError> {
    let user = session.require_user()?;
    let not_found = || ApiError::from(GatewayError::NotFound("Notice".to_string()));

    let id = NoticeId::parse(&id).map_err(|_| not_found())?;
    if !state.deps.notices.dismiss(user.id, id).await {
        return Err(not_found());
    }
    Ok(Json(GatewayResult::ok(json!({ "id": id }))))
}
