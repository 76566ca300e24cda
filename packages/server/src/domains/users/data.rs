use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{Capability, RoleState, SessionContext, SessionUser};
use crate::domains::users::models::{User, UserStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company_id: Option<String>,
    pub role_id: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            full_name: user.full_name,
            company_id: user.company_id.map(|id| id.to_string()),
            role_id: user.role_id.map(|id| id.to_string()),
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// Body of `POST /api/admin/invite-user`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InviteUserInput {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub company_id: Option<String>,
    pub role_id: Option<String>,
}

impl InviteUserInput {
    /// Wire names of fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("email", &self.email),
            ("fullName", &self.full_name),
            ("companyId", &self.company_id),
            ("roleId", &self.role_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// What `GET /api/session` reports about the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user: Option<SessionUser>,
    pub role: RoleState,
    pub capabilities: Vec<Capability>,
}

impl From<&SessionContext> for SessionData {
    fn from(session: &SessionContext) -> Self {
        let role = session.role_state();
        Self {
            user: session.user().cloned(),
            role,
            capabilities: role
                .role()
                .map(|r| r.capabilities().to_vec())
                .unwrap_or_default(),
        }
    }
}
