use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::common::{CompanyId, RoleId, UserId};
use crate::kernel::{Gateway, GatewayError, RowQuery, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Invited,
    Active,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Invited => write!(f, "invited"),
            UserStatus::Active => write!(f, "active"),
        }
    }
}

/// User model - row in the `users` table
///
/// `id` is the auth user id, so a session resolves straight to this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub role_id: Option<RoleId>,
    #[serde(default)]
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn find_by_id(id: UserId, gateway: &Gateway) -> Result<Option<Self>, GatewayError> {
        gateway
            .fetch_optional(Table::Users, &RowQuery::all().eq("id", id))
            .await
    }

    pub async fn insert(&self, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway.insert_row(Table::Users, self).await
    }

    /// First sign-in after an invitation.
    pub async fn mark_active(id: UserId, gateway: &Gateway) -> Result<(), GatewayError> {
        gateway
            .update_rows::<Self>(
                Table::Users,
                &RowQuery::all().eq("id", id).eq("status", UserStatus::Invited),
                json!({ "status": UserStatus::Active }),
            )
            .await?;
        Ok(())
    }
}
