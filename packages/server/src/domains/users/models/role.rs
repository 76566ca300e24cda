use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{Role, RoleId};
use crate::kernel::{Gateway, GatewayError, RowQuery, Table};

/// Row in the `roles` table. `name` holds one of the role names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub name: String,
}

impl RoleDefinition {
    pub async fn find_by_id(id: RoleId, gateway: &Gateway) -> Result<Option<Self>, GatewayError> {
        gateway
            .fetch_optional(Table::Roles, &RowQuery::all().eq("id", id))
            .await
    }

    /// The role this row grants. Names we do not recognize grant the least.
    pub fn role(&self) -> Role {
        self.name.parse().unwrap_or_else(|_| {
            warn!(role_id = %self.id, name = %self.name, "Unknown role name, treating as view_only");
            Role::ViewOnly
        })
    }
}
