// TestDependencies - in-memory implementations for testing
//
// Provides backend, auth and renderer doubles that can be injected into
// ServerDeps for tests. Each double records what it was asked to do.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    AuthIdentity, BackendError, BaseAuthService, BaseBackend, BasePdfRenderer,
    HtmlPreviewRenderer, PdfPreview, RowQuery, ServerDeps, Table,
};

// =============================================================================
// In-memory Backend
// =============================================================================

/// Row store keyed by table. Rows are plain JSON objects.
#[derive(Default)]
pub struct InMemoryBackend {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    calls: AtomicUsize,
    writes: AtomicUsize,
    next_error: Mutex<Option<BackendError>>,
    table_errors: Mutex<HashMap<(Table, bool), BackendError>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .extend(rows);
        self
    }

    pub fn seed(&self, table: Table, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .push(row);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of backend calls made so far (any operation).
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of insert/update/delete calls made so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: BackendError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Make the next call that touches `table` fail with `error`. Calls on
    /// other tables go through untouched.
    pub fn fail_next_on(&self, table: Table, error: BackendError) {
        self.table_errors.lock().unwrap().insert((table, false), error);
    }

    /// Like `fail_next_on`, but reads of `table` are let through.
    pub fn fail_next_write_on(&self, table: Table, error: BackendError) {
        self.table_errors.lock().unwrap().insert((table, true), error);
    }

    fn begin(&self, table: Table) -> Result<(), BackendError> {
        self.start(table, false)
    }

    fn begin_write(&self, table: Table) -> Result<(), BackendError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.start(table, true)
    }

    fn start(&self, table: Table, write: bool) -> Result<(), BackendError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }
        let mut table_errors = self.table_errors.lock().unwrap();
        let error = match table_errors.remove(&(table, false)) {
            Some(error) => Some(error),
            None if write => table_errors.remove(&(table, true)),
            None => None,
        };
        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            // Timestamps differ in fractional digits, so compare them as instants.
            match (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl BaseBackend for InMemoryBackend {
    async fn select(&self, table: Table, query: &RowQuery) -> Result<Vec<Value>, BackendError> {
        self.begin(table)?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(
                    a.get(column).unwrap_or(&Value::Null),
                    b.get(column).unwrap_or(&Value::Null),
                );
                if *ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value, BackendError> {
        self.begin_write(table)?;
        let Some(object) = row.as_object_mut() else {
            return Err(BackendError::Rejected {
                code: Some("PGRST102".into()),
                message: "Row must be a JSON object".into(),
            });
        };
        if !object.contains_key("id") {
            object.insert("id".into(), Value::String(uuid::Uuid::now_v7().to_string()));
        }

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        if rows.iter().any(|r| r.get("id") == row.get("id")) {
            return Err(BackendError::Rejected {
                code: Some("23505".into()),
                message: format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
            });
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        query: &RowQuery,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError> {
        self.begin_write(table)?;
        let patch: Map<String, Value> = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(BackendError::Rejected {
                    code: Some("PGRST102".into()),
                    message: "Patch must be a JSON object".into(),
                })
            }
        };

        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !query.matches(row) {
                continue;
            }
            if let Some(object) = row.as_object_mut() {
                for (key, value) in &patch {
                    object.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, query: &RowQuery) -> Result<usize, BackendError> {
        self.begin_write(table)?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !query.matches(row));
        Ok(before - rows.len())
    }
}

// =============================================================================
// Mock Auth Service
// =============================================================================

#[derive(Default)]
pub struct MockAuthService {
    sessions: Mutex<HashMap<String, AuthIdentity>>,
    invites: Mutex<Vec<(String, Value)>>,
    invite_error: Mutex<Option<BackendError>>,
    session_error: Mutex<Option<BackendError>>,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an access token that resolves to `identity`.
    pub fn with_session(self, token: &str, identity: AuthIdentity) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
        self
    }

    pub fn add_session(&self, token: &str, identity: AuthIdentity) {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), identity);
    }

    pub fn fail_invites_with(&self, error: BackendError) {
        *self.invite_error.lock().unwrap() = Some(error);
    }

    /// Make every session lookup fail with `error`.
    pub fn fail_sessions_with(&self, error: BackendError) {
        *self.session_error.lock().unwrap() = Some(error);
    }

    /// All invitations sent, as (email, metadata).
    pub fn invites(&self) -> Vec<(String, Value)> {
        self.invites.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseAuthService for MockAuthService {
    async fn invite_user(&self, email: &str, metadata: Value) -> Result<AuthIdentity, BackendError> {
        if let Some(error) = self.invite_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.invites
            .lock()
            .unwrap()
            .push((email.to_string(), metadata.clone()));
        Ok(AuthIdentity {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            metadata,
        })
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<AuthIdentity>, BackendError> {
        if let Some(error) = self.session_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }
}

// =============================================================================
// Mock PDF Renderer
// =============================================================================

/// Delegates to the HTML renderer unless told to fail.
#[derive(Default)]
pub struct MockPdfRenderer {
    fail: Mutex<bool>,
    calls: Mutex<Vec<usize>>,
}

impl MockPdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let renderer = Self::default();
        *renderer.fail.lock().unwrap() = true;
        renderer
    }

    /// Input sizes of each render call.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePdfRenderer for MockPdfRenderer {
    async fn render_previews(&self, rfis: &[Value]) -> Result<Vec<PdfPreview>> {
        self.calls.lock().unwrap().push(rfis.len());
        if *self.fail.lock().unwrap() {
            anyhow::bail!("renderer crashed");
        }
        HtmlPreviewRenderer::new().render_previews(rfis).await
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of doubles plus the `ServerDeps` built from them.
pub struct TestDependencies {
    pub backend: Arc<InMemoryBackend>,
    pub auth: Arc<MockAuthService>,
    pub pdf_renderer: Arc<MockPdfRenderer>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
            auth: Arc::new(MockAuthService::new()),
            pdf_renderer: Arc::new(MockPdfRenderer::new()),
        }
    }

    pub fn with_pdf_renderer(mut self, renderer: MockPdfRenderer) -> Self {
        self.pdf_renderer = Arc::new(renderer);
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.backend.clone(),
            self.auth.clone(),
            self.pdf_renderer.clone(),
            Duration::from_secs(5),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let backend = InMemoryBackend::new().with_rows(
            Table::Rfis,
            vec![
                json!({"id": "1", "project_id": "p", "n": 2}),
                json!({"id": "2", "project_id": "p", "n": 1}),
                json!({"id": "3", "project_id": "q", "n": 3}),
            ],
        );
        let rows = backend
            .select(Table::Rfis, &RowQuery::all().eq("project_id", "p").order_by("n", true))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let rows = backend
            .select(Table::Rfis, &RowQuery::all().order_by("n", false).limit(1))
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], "3");
    }

    #[tokio::test]
    async fn test_update_only_touches_matching_rows() {
        let backend = InMemoryBackend::new().with_rows(
            Table::Rfis,
            vec![json!({"id": "1", "status": "open"}), json!({"id": "2", "status": "open"})],
        );
        let updated = backend
            .update(Table::Rfis, &RowQuery::all().eq("id", "1"), json!({"status": "closed"}))
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(backend.rows(Table::Rfis)[1]["status"], "open");
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let backend = InMemoryBackend::new();
        backend.insert(Table::Projects, json!({"id": "x"})).await.unwrap();
        let err = backend.insert(Table::Projects, json!({"id": "x"})).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected { code: Some(ref c), .. } if c == "23505"));
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let backend = InMemoryBackend::new();
        backend.fail_next(BackendError::Network("down".into()));

        assert!(backend.select(Table::Projects, &RowQuery::all()).await.is_err());
        assert!(backend.select(Table::Projects, &RowQuery::all()).await.is_ok());
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_table_failure_waits_for_its_table() {
        let backend = InMemoryBackend::new();
        backend.fail_next_on(Table::Attachments, BackendError::Network("down".into()));

        assert!(backend.select(Table::Rfis, &RowQuery::all()).await.is_ok());
        assert!(backend
            .insert(Table::Attachments, json!({"id": "a"}))
            .await
            .is_err());
        assert!(backend
            .insert(Table::Attachments, json!({"id": "a"}))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_write_failure_lets_reads_through() {
        let backend = InMemoryBackend::new();
        backend.fail_next_write_on(Table::Rfis, BackendError::Network("down".into()));

        assert!(backend.select(Table::Rfis, &RowQuery::all()).await.is_ok());
        assert!(backend.delete(Table::Rfis, &RowQuery::all()).await.is_err());
        assert!(backend.delete(Table::Rfis, &RowQuery::all()).await.is_ok());
    }
}
