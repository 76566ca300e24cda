//! Invite user action

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::{Capability, CompanyId, FieldError, RoleId, SessionContext, UserId, Validator};
use crate::domains::users::data::InviteUserInput;
use crate::domains::users::models::{RoleDefinition, User, UserStatus};
use crate::kernel::{BackendError, GatewayError, ServerDeps};

/// Send an invitation through the auth service and record the invited user.
///
/// The role must exist before anything is sent. The users row is written
/// with status `invited` and flips to `active` on first sign-in.
pub async fn invite_user(
    input: InviteUserInput,
    session: &SessionContext,
    deps: &ServerDeps,
) -> Result<User, GatewayError> {
    let inviter = session.require(Capability::InviteUsers)?;

    let email = input.email.as_deref().unwrap_or_default().trim().to_lowercase();
    let full_name = input.full_name.as_deref().unwrap_or_default().trim().to_string();
    let company = input.company_id.as_deref().unwrap_or_default().trim();
    let role = input.role_id.as_deref().unwrap_or_default().trim();

    let mut validator = Validator::new();
    validator
        .required("email", &email, "Email")
        .email("email", &email)
        .required("fullName", &full_name, "Full name")
        .required("companyId", company, "Company")
        .required("roleId", role, "Role");
    if !company.is_empty() && CompanyId::parse(company).is_err() {
        validator.error("companyId", "Invalid company id");
    }
    if !role.is_empty() && RoleId::parse(role).is_err() {
        validator.error("roleId", "Invalid role id");
    }
    validator.finish()?;

    let company_id = CompanyId::parse(company).map_err(|_| invalid_id("companyId"))?;
    let role_id = RoleId::parse(role).map_err(|_| invalid_id("roleId"))?;

    let role_row = RoleDefinition::find_by_id(role_id, &deps.gateway)
        .await?
        .ok_or_else(|| GatewayError::NotFound("Role".to_string()))?;

    let identity = deps
        .auth
        .invite_user(
            &email,
            json!({
                "full_name": full_name,
                "company_id": company_id,
                "role_id": role_id,
            }),
        )
        .await
        .map_err(|e| {
            tracing::warn!(email = %email, error = %e, "Invitation failed");
            GatewayError::from(e)
        })?;

    let user_id = UserId::parse(&identity.id).map_err(|_| {
        GatewayError::Backend(BackendError::Decode(format!(
            "auth service returned a non-uuid user id: {}",
            identity.id
        )))
    })?;

    let user = User {
        id: user_id,
        email: identity.email.unwrap_or(email),
        full_name: Some(full_name),
        company_id: Some(company_id),
        role_id: Some(role_id),
        status: UserStatus::Invited,
        created_at: Utc::now(),
    }
    .insert(&deps.gateway)
    .await?;

    info!(
        user_id = %user.id,
        role = %role_row.role(),
        invited_by = %inviter.id,
        "User invited"
    );
    Ok(user)
}

fn invalid_id(field: &str) -> GatewayError {
    GatewayError::Validation(vec![FieldError {
        field: field.to_string(),
        message: "Invalid id".to_string(),
    }])
}
