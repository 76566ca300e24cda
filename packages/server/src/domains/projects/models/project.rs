use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ProjectId;
use crate::kernel::{Gateway, GatewayError, RowQuery, Table};

/// Project model - row in the `projects` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub contract_number: String,
    pub client_company: String,
    pub project_manager_email: String,

    // Sets, stored as arrays without duplicates
    #[serde(default)]
    pub standard_recipients: Vec<String>,
    #[serde(default)]
    pub disciplines: Vec<String>,

    /// New RFIs on this project start as urgent.
    #[serde(default)]
    pub default_urgent: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub async fn find_by_id(id: ProjectId, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway
            .fetch_one(Table::Projects, &RowQuery::all().eq("id", id), "Project")
            .await
    }

    /// All projects, newest first.
    pub async fn find_all(gateway: &Gateway) -> Result<Vec<Self>, GatewayError> {
        gateway
            .fetch_all(
                Table::Projects,
                &RowQuery::all().order_by("created_at", false),
            )
            .await
    }

    pub async fn insert(&self, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway.insert_row(Table::Projects, self).await
    }
}
