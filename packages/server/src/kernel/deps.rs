//! Server dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to every action.
//! All external services sit behind trait objects so tests can swap in the
//! in-memory doubles from `test_dependencies`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use supabase::{SupabaseError, SupabaseService};

use crate::kernel::{
    AuthIdentity, BackendError, BaseAuthService, BaseBackend, BasePdfRenderer, Gateway,
    NoticeBoard, RowQuery, Table,
};

// =============================================================================
// SupabaseService Adapter (implements BaseBackend + BaseAuthService)
// =============================================================================

/// Wrapper around SupabaseService that implements the backend traits
pub struct SupabaseAdapter(pub Arc<SupabaseService>);

impl SupabaseAdapter {
    pub fn new(service: Arc<SupabaseService>) -> Self {
        Self(service)
    }

    fn query(&self, table: Table, query: &RowQuery) -> supabase::TableQuery<'_> {
        let mut builder = self.0.from(table.as_str());
        for (column, value) in &query.filters {
            builder = builder.eq(column, filter_value(value));
        }
        if let Some((column, ascending)) = &query.order {
            builder = builder.order(column, *ascending);
        }
        if let Some(limit) = query.limit {
            builder = builder.limit(limit);
        }
        builder
    }
}

/// PostgREST filter text for a JSON value (strings unquoted).
fn filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

impl From<SupabaseError> for BackendError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Network(message) => BackendError::Network(message),
            SupabaseError::Api { code, message, .. } => BackendError::Rejected { code, message },
            SupabaseError::Parse(message) => BackendError::Decode(message),
            SupabaseError::Config(message) => BackendError::Rejected {
                code: None,
                message,
            },
        }
    }
}

#[async_trait]
impl BaseBackend for SupabaseAdapter {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, BackendError> {
        Ok(self.query(table, query).select().await?)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError> {
        self.0
            .from(table.as_str())
            .insert(&row)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(
        &self,
        table: Table,
        query: &RowQuery,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        Ok(self.query(table, query).update(&patch).await?)
    }

    async fn delete(&self, table: Table, query: &RowQuery) -> Result<usize, BackendError> {
        Ok(self.query(table, query).delete().await?.len())
    }
}

#[async_trait]
impl BaseAuthService for SupabaseAdapter {
    async fn invite_user(&self, email: &str, metadata: Value) -> Result<AuthIdentity, BackendError> {
        let user = self.0.invite_user_by_email(email, &metadata).await?;
        Ok(AuthIdentity {
            id: user.id,
            email: user.email,
            metadata: user.user_metadata,
        })
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError> {
        let user = self.0.get_user(access_token).await?;
        Ok(user.map(|user| AuthIdentity {
            id: user.id,
            email: user.email,
            metadata: user.user_metadata,
        }))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub gateway: Gateway,
    pub auth: Arc<dyn BaseAuthService>,
    pub pdf_renderer: Arc<dyn BasePdfRenderer>,
    pub notices: NoticeBoard,
}

impl ServerDeps {
    pub fn new(
        backend: Arc<dyn BaseBackend>,
        auth: Arc<dyn BaseAuthService>,
        pdf_renderer: Arc<dyn BasePdfRenderer>,
        notice_ttl: Duration,
    ) -> Self {
        Self {
            gateway: Gateway::new(backend),
            auth,
            pdf_renderer,
            notices: NoticeBoard::new(notice_ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_values_are_unquoted() {
        assert_eq!(filter_value(&json!("abc")), "abc");
        assert_eq!(filter_value(&json!(3)), "3");
        assert_eq!(filter_value(&json!(true)), "true");
        assert_eq!(filter_value(&Value::Null), "null");
    }

    #[test]
    fn test_supabase_errors_map_to_backend_kinds() {
        assert_eq!(
            BackendError::from(SupabaseError::Network("refused".into())),
            BackendError::Network("refused".into())
        );
        assert_eq!(
            BackendError::from(SupabaseError::Api {
                status: 409,
                code: Some("23505".into()),
                message: "duplicate".into(),
            }),
            BackendError::Rejected {
                code: Some("23505".into()),
                message: "duplicate".into(),
            }
        );
    }
}
