//! Session resolution
//!
//! Turns an access token into a `SessionContext`. The role comes from the
//! `users` and `roles` tables; if that lookup fails the session stays
//! pending, so every check fails closed with the "still loading" answer
//! instead of a denial.

use tracing::{debug, warn};

use crate::common::{Role, SessionContext, SessionUser, UserId};
use crate::domains::users::models::{RoleDefinition, User, UserStatus};
use crate::kernel::{Gateway, GatewayError, ServerDeps};

/// `Ok(None)` when the token does not belong to a live session.
pub async fn resolve_session(
    access_token: &str,
    deps: &ServerDeps,
) -> Result<Option<SessionContext>, GatewayError> {
    let Some(identity) = deps.auth.get_session(access_token).await? else {
        return Ok(None);
    };
    let Ok(user_id) = UserId::parse(&identity.id) else {
        warn!(auth_id = %identity.id, "Session user id is not a uuid");
        return Ok(None);
    };

    let profile = match User::find_by_id(user_id, &deps.gateway).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "User lookup failed, role left pending");
            let user = SessionUser {
                id: user_id,
                email: identity.email.unwrap_or_default(),
                full_name: None,
            };
            return Ok(Some(SessionContext::started(user)));
        }
    };

    let metadata_name = identity
        .metadata
        .get("full_name")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let mut session = SessionContext::started(SessionUser {
        id: user_id,
        email: profile
            .as_ref()
            .map(|p| p.email.clone())
            .or(identity.email)
            .unwrap_or_default(),
        full_name: profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .or(metadata_name),
    });

    match resolve_role(profile.as_ref(), &deps.gateway).await {
        Ok(role) => session.resolve(role),
        Err(e) => warn!(user_id = %user_id, error = %e, "Role lookup failed, role left pending"),
    }

    if let Some(profile) = &profile {
        if profile.status == UserStatus::Invited {
            if let Err(e) = User::mark_active(profile.id, &deps.gateway).await {
                warn!(user_id = %profile.id, error = %e, "Could not mark invited user active");
            }
        }
    }

    debug!(user_id = %user_id, role = ?session.role_state(), "Session resolved");
    Ok(Some(session))
}

/// Role for a user row. No row, no role id, or an unknown role id all give
/// `view_only`.
pub async fn resolve_role(user: Option<&User>, gateway: &Gateway) -> Result<Role, GatewayError> {
    let Some(role_id) = user.and_then(|u| u.role_id) else {
        return Ok(Role::ViewOnly);
    };
    Ok(RoleDefinition::find_by_id(role_id, gateway)
        .await?
        .map(|row| row.role())
        .unwrap_or(Role::ViewOnly))
}
