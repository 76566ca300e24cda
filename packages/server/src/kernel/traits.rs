// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The lifecycle and permission rules live in domains/ and common/auth and
// reach the outside world only through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseBackend, BasePdfRenderer)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Backend Trait (Infrastructure - hosted rows)
// =============================================================================

/// Tables the service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Rfis,
    RfiResponses,
    Projects,
    Attachments,
    Users,
    Roles,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Rfis => "rfis",
            Table::RfiResponses => "rfi_responses",
            Table::Projects => "projects",
            Table::Attachments => "attachments",
            Table::Users => "users",
            Table::Roles => "roles",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filters plus optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl RowQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.filters.push((column.to_string(), value));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row satisfies every filter. Used by in-process backends.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, expected)| row.get(column).unwrap_or(&Value::Null) == expected)
    }
}

/// Failure of a call to the hosted backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// No response at all (connection, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered and refused (constraint violation, bad filter, auth).
    #[error("Backend rejected request: {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    /// A conditional write matched no row.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend answered with data we could not read.
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait BaseBackend: Send + Sync {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError>;

    /// Patch every row matching the query and return the updated rows.
    async fn update(
        &self,
        table: Table,
        query: &RowQuery,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError>;

    /// Delete every row matching the query and return how many went away.
    async fn delete(&self, table: Table, query: &RowQuery) -> Result<usize, BackendError>;
}

// =============================================================================
// Auth Service Trait (Infrastructure - invitations and sessions)
// =============================================================================

/// The auth subsystem's view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

#[async_trait]
pub trait BaseAuthService: Send + Sync {
    /// Create the auth user and send the invitation e-mail.
    async fn invite_user(&self, email: &str, metadata: Value) -> Result<AuthIdentity, BackendError>;

    /// Resolve an access token. `Ok(None)` when the token is not valid.
    async fn get_session(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError>;
}

// =============================================================================
// PDF Renderer Trait (Infrastructure - export previews)
// =============================================================================

/// One rendered preview, in the same position as its input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfPreview {
    pub rfi_id: Option<String>,
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded artifact.
    pub content: String,
}

#[async_trait]
pub trait BasePdfRenderer: Send + Sync {
    async fn render_previews(&self, rfis: &[Value]) -> anyhow::Result<Vec<PdfPreview>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_query_matches_all_filters() {
        let query = RowQuery::all().eq("project_id", "p-1").eq("status", "open");
        assert!(query.matches(&json!({"project_id": "p-1", "status": "open", "title": "x"})));
        assert!(!query.matches(&json!({"project_id": "p-1", "status": "closed"})));
        assert!(!query.matches(&json!({"status": "open"})));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(RowQuery::all().matches(&json!({"anything": 1})));
    }
}
