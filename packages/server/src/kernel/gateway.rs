//! Request/response gateway.
//!
//! Turns a typed intent into exactly one backend call and folds whatever
//! comes back into `GatewayResult<T>`. Nothing here retries: a failed call
//! surfaces immediately to the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{BackendError, BaseBackend, RowQuery, Table};
use crate::common::{AuthError, FieldError, ValidationErrors};

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const NETWORK_FAILURE: &str = "Network error. Check your connection and try again.";

/// The one result shape presentation code ever sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl<T> GatewayResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: Vec::new(),
        }
    }

    pub fn failed(err: &GatewayError) -> Self {
        let details = match err {
            GatewayError::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            data: None,
            error: Some(err.user_message()),
            details,
        }
    }
}

impl<T> From<Result<T, GatewayError>> for GatewayResult<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(data) => GatewayResult::ok(data),
            Err(err) => GatewayResult::failed(&err),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Permission(#[from] AuthError),

    #[error("Invalid transition: {0}")]
    Transition(String),

    #[error("No change: {0}")]
    NoOp(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Backend(BackendError),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(message) => GatewayError::Network(message),
            other => GatewayError::Backend(other),
        }
    }
}

impl From<ValidationErrors> for GatewayError {
    fn from(err: ValidationErrors) -> Self {
        GatewayError::Validation(err.0)
    }
}

impl GatewayError {
    /// Stable, human-readable text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation(_) => "Validation failed".to_string(),
            GatewayError::Permission(AuthError::AuthenticationRequired) => {
                "Please sign in to continue.".to_string()
            }
            GatewayError::Permission(AuthError::RolePending) => {
                "Your permissions are still loading. Please try again in a moment.".to_string()
            }
            GatewayError::Permission(AuthError::PermissionDenied(_)) => {
                "You do not have permission to perform this action.".to_string()
            }
            GatewayError::Transition(message) | GatewayError::NoOp(message) => message.clone(),
            GatewayError::NotFound(what) => format!("{} not found", what),
            GatewayError::Backend(BackendError::Rejected { code, message }) => {
                backend_message(code.as_deref(), message)
            }
            GatewayError::Backend(BackendError::Conflict(_)) => {
                "This record was changed by someone else. Refresh and try again.".to_string()
            }
            GatewayError::Backend(_) => GENERIC_FAILURE.to_string(),
            GatewayError::Network(_) => NETWORK_FAILURE.to_string(),
        }
    }
}

/// Map a backend refusal to text a user may see.
fn backend_message(code: Option<&str>, message: &str) -> String {
    let known = match code {
        Some("23505") => Some("A record with these details already exists."),
        Some("23503") => Some("A related record is missing or still in use."),
        Some("23502") => Some("A required value is missing."),
        Some("23514") => Some("A value is outside the allowed range."),
        _ => None,
    };
    if let Some(text) = known {
        return text.to_string();
    }

    if is_presentable(message) {
        message.to_string()
    } else {
        GENERIC_FAILURE.to_string()
    }
}

/// Short single-line text without database internals.
fn is_presentable(message: &str) -> bool {
    const INTERNAL_MARKERS: [&str; 8] = [
        "sql", "syntax", "relation", "column", "constraint", "stack", "panic", "exception",
    ];

    let trimmed = message.trim();
    if trimmed.is_empty() || trimmed.len() > 160 || trimmed.contains('\n') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !INTERNAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Typed row access over a `BaseBackend`.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn BaseBackend>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn BaseBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &RowQuery,
    ) -> Result<Vec<T>, GatewayError> {
        let rows = self.backend.select(table, query).await.map_err(|e| {
            warn!(%table, error = %e, "Select failed");
            GatewayError::from(e)
        })?;
        rows.into_iter().map(|row| decode(table, row)).collect()
    }

    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &RowQuery,
    ) -> Result<Option<T>, GatewayError> {
        let query = query.clone().limit(1);
        Ok(self.fetch_all(table, &query).await?.into_iter().next())
    }

    /// Fetch exactly one row; `what` names the entity in the not-found message.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &RowQuery,
        what: &str,
    ) -> Result<T, GatewayError> {
        self.fetch_optional(table, query)
            .await?
            .ok_or_else(|| GatewayError::NotFound(what.to_string()))
    }

    pub async fn insert_row<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        row: &T,
    ) -> Result<T, GatewayError> {
        let payload = encode(table, row)?;
        let stored = self.backend.insert(table, payload).await.map_err(|e| {
            warn!(%table, error = %e, "Insert failed");
            GatewayError::from(e)
        })?;
        debug!(%table, "Row inserted");
        decode(table, stored)
    }

    pub async fn update_rows<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &RowQuery,
        patch: Value,
    ) -> Result<Vec<T>, GatewayError> {
        let rows = self
            .backend
            .update(table, query, patch)
            .await
            .map_err(|e| {
                warn!(%table, error = %e, "Update failed");
                GatewayError::from(e)
            })?;
        rows.into_iter().map(|row| decode(table, row)).collect()
    }

    pub async fn delete_rows(&self, table: Table, query: &RowQuery) -> Result<usize, GatewayError> {
        self.backend.delete(table, query).await.map_err(|e| {
            warn!(%table, error = %e, "Delete failed");
            GatewayError::from(e)
        })
    }
}

fn encode<T: Serialize>(table: Table, row: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(row).map_err(|e| {
        GatewayError::Backend(BackendError::Decode(format!("{}: {}", table, e)))
    })
}

fn decode<T: DeserializeOwned>(table: Table, row: Value) -> Result<T, GatewayError> {
    serde_json::from_value(row).map_err(|e| {
        warn!(%table, error = %e, "Row did not match model");
        GatewayError::Backend(BackendError::Decode(format!("{}: {}", table, e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_reads_back_with_details() {
        let err = GatewayError::Validation(vec![FieldError {
            field: "title".into(),
            message: "Title is required".into(),
        }]);
        let body = serde_json::to_string(&GatewayResult::<()>::failed(&err)).unwrap();

        let parsed: GatewayResult<()> = serde_json::from_str(&body).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("Validation failed"));
        assert_eq!(parsed.details[0].field, "title");
    }

    #[test]
    fn test_network_and_backend_are_distinct() {
        let network = GatewayError::from(BackendError::Network("connection refused".into()));
        let backend = GatewayError::from(BackendError::Rejected {
            code: None,
            message: "Project is archived".into(),
        });

        assert!(matches!(network, GatewayError::Network(_)));
        assert_eq!(network.user_message(), NETWORK_FAILURE);
        assert_eq!(backend.user_message(), "Project is archived");
    }

    #[test]
    fn test_internal_backend_text_is_hidden() {
        let err = GatewayError::from(BackendError::Rejected {
            code: Some("42703".into()),
            message: "column \"foo\" of relation \"rfis\" does not exist".into(),
        });
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_known_constraint_codes_get_friendly_text() {
        let err = GatewayError::from(BackendError::Rejected {
            code: Some("23505".into()),
            message: "duplicate key value violates unique constraint \"projects_pkey\"".into(),
        });
        assert_eq!(err.user_message(), "A record with these details already exists.");
    }

    #[test]
    fn test_validation_result_carries_field_details() {
        let err = GatewayError::Validation(vec![FieldError {
            field: "name".into(),
            message: "Project name is required".into(),
        }]);
        let result: GatewayResult<()> = Err(err).into();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Validation failed"));
        assert_eq!(result.details.len(), 1);
    }

    #[test]
    fn test_success_shape_omits_error() {
        let json = serde_json::to_value(GatewayResult::ok(serde_json::json!({"id": "x"}))).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {"id": "x"}}));
    }

    #[test]
    fn test_permission_messages_differ_for_pending() {
        let pending = GatewayError::from(AuthError::RolePending).user_message();
        let denied = GatewayError::from(AuthError::PermissionDenied("delete_rfi".into())).user_message();
        assert_ne!(pending, denied);
    }
}
