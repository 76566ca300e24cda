use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::common::{ProjectId, RfiId, UserId};
use crate::kernel::{BackendError, Gateway, GatewayError, RowQuery, Table};

// ============================================================================
// Status
// ============================================================================

/// RFI status. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfiStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl RfiStatus {
    pub const ALL: [RfiStatus; 3] = [RfiStatus::Open, RfiStatus::InProgress, RfiStatus::Closed];

    /// The transition table. Anything not listed here is rejected.
    pub fn allowed_targets(&self) -> &'static [RfiStatus] {
        match self {
            RfiStatus::Open => &[RfiStatus::InProgress, RfiStatus::Closed],
            RfiStatus::InProgress => &[RfiStatus::Closed],
            RfiStatus::Closed => &[],
        }
    }

    pub fn can_transition_to(&self, target: RfiStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RfiStatus::Open => "open",
            RfiStatus::InProgress => "in_progress",
            RfiStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for RfiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RfiStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(RfiStatus::Open),
            "in_progress" => Ok(RfiStatus::InProgress),
            "closed" => Ok(RfiStatus::Closed),
            _ => Err(anyhow::anyhow!("Invalid RFI status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Standard,
    Urgent,
}

impl Urgency {
    pub fn from_flag(urgent: bool) -> Self {
        if urgent {
            Urgency::Urgent
        } else {
            Urgency::Standard
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Standard => write!(f, "standard"),
            Urgency::Urgent => write!(f, "urgent"),
        }
    }
}

// ============================================================================
// Rfi Model
// ============================================================================

/// RFI model - row in the `rfis` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Rfi {
    #[builder(default = RfiId::new())]
    pub id: RfiId,
    pub project_id: ProjectId,
    pub rfi_number: String,

    pub title: String,
    pub description: String,

    #[builder(default)]
    pub status: RfiStatus,
    #[builder(default)]
    pub urgency: Urgency,
    #[builder(default, setter(strip_option))]
    pub discipline: Option<String>,
    #[builder(default, setter(strip_option))]
    pub due_date: Option<NaiveDate>,

    pub created_by: UserId,
    #[builder(default, setter(strip_option))]
    pub assigned_to: Option<UserId>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Rfi {
    pub async fn find_by_id(id: RfiId, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway
            .fetch_one(Table::Rfis, &RowQuery::all().eq("id", id), "RFI")
            .await
    }

    /// Newest first, optionally limited to one project.
    pub async fn find_all(
        project_id: Option<ProjectId>,
        gateway: &Gateway,
    ) -> Result<Vec<Self>, GatewayError> {
        let mut query = RowQuery::all();
        if let Some(project_id) = project_id {
            query = query.eq("project_id", project_id);
        }
        gateway
            .fetch_all(Table::Rfis, &query.order_by("created_at", false))
            .await
    }

    /// Next `RFI-NNN` number for a project, one past the highest in use.
    pub async fn next_number(project_id: ProjectId, gateway: &Gateway) -> Result<String, GatewayError> {
        let existing: Vec<Value> = gateway
            .fetch_all(Table::Rfis, &RowQuery::all().eq("project_id", project_id))
            .await?;
        let numbers = existing
            .iter()
            .filter_map(|row| row.get("rfi_number").and_then(Value::as_str));
        number_after(numbers).ok_or_else(|| {
            GatewayError::from(BackendError::Decode(format!(
                "RFI numbers for project {} are exhausted",
                project_id
            )))
        })
    }

    pub async fn insert(&self, gateway: &Gateway) -> Result<Self, GatewayError> {
        gateway.insert_row(Table::Rfis, self).await
    }

    /// Conditional status write: only applies while the stored status is
    /// still `from`. Zero matched rows is a conflict.
    pub async fn update_status_if(
        id: RfiId,
        from: RfiStatus,
        to: RfiStatus,
        updated_at: DateTime<Utc>,
        gateway: &Gateway,
    ) -> Result<Self, GatewayError> {
        gateway
            .update_rows::<Self>(
                Table::Rfis,
                &RowQuery::all().eq("id", id).eq("status", from),
                serde_json::json!({ "status": to, "updated_at": updated_at }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                GatewayError::from(BackendError::Conflict(format!(
                    "RFI {} is no longer {}",
                    id, from
                )))
            })
    }

    pub async fn delete(id: RfiId, gateway: &Gateway) -> Result<bool, GatewayError> {
        let removed = gateway
            .delete_rows(Table::Rfis, &RowQuery::all().eq("id", id))
            .await?;
        Ok(removed > 0)
    }
}

/// One past the highest stored number; `None` once the counter is full.
fn number_after<'a>(numbers: impl Iterator<Item = &'a str>) -> Option<String> {
    let highest = numbers.filter_map(parse_number).max().unwrap_or(0);
    highest.checked_add(1).map(format_number)
}

fn parse_number(value: &str) -> Option<u32> {
    value.strip_prefix("RFI-")?.parse().ok()
}

fn format_number(n: u32) -> String {
    format!("RFI-{:03}", n)
}
