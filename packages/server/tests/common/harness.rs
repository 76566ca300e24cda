//! Test harness for HTTP-level integration tests.
//!
//! Every test gets its own in-memory backend, auth double and router. One
//! user per role is seeded, each signed in with the token `<role>-token`.

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use rfi_core::common::{Role, RoleId, UserId};
use rfi_core::domains::users::{RoleDefinition, User, UserStatus};
use rfi_core::kernel::test_dependencies::{MockPdfRenderer, TestDependencies};
use rfi_core::kernel::{AuthIdentity, Table};
use rfi_core::server::{build_app, AppOptions};
use serde_json::{json, Value};
use test_context::AsyncTestContext;
use tower::ServiceExt;

pub struct TestHarness {
    pub deps: TestDependencies,
    pub app: Router,
    pub roles: HashMap<Role, RoleId>,
    pub users: HashMap<Role, UserId>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    /// Harness whose PDF renderer always fails.
    pub fn with_failing_renderer() -> Self {
        Self::with_deps(TestDependencies::new().with_pdf_renderer(MockPdfRenderer::failing()))
    }

    fn with_deps(deps: TestDependencies) -> Self {
        // RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut roles = HashMap::new();
        let mut users = HashMap::new();
        for role in Role::ALL {
            let role_id = RoleId::new();
            deps.backend.seed(
                Table::Roles,
                to_row(&RoleDefinition {
                    id: role_id,
                    name: role.as_str().to_string(),
                }),
            );

            let user = User {
                id: UserId::new(),
                email: format!("{}@example.com", role),
                full_name: Some(format!("Test {}", role)),
                company_id: None,
                role_id: Some(role_id),
                status: UserStatus::Active,
                created_at: Utc::now(),
            };
            deps.backend.seed(Table::Users, to_row(&user));
            deps.auth.add_session(
                &Self::token(role),
                AuthIdentity {
                    id: user.id.to_string(),
                    email: Some(user.email.clone()),
                    metadata: json!({}),
                },
            );

            roles.insert(role, role_id);
            users.insert(role, user.id);
        }

        let app = build_app(deps.server_deps(), AppOptions::default());
        Self {
            deps,
            app,
            roles,
            users,
        }
    }

    pub fn token(role: Role) -> String {
        format!("{}-token", role)
    }

    /// Send a request as one of the seeded users and read the JSON answer.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        role: Option<Role>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = role.map(Self::token);
        self.request_with_token(method, uri, token.as_deref(), body)
            .await
    }

    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        read_json(response).await
    }

    pub async fn get(&self, uri: &str, role: Option<Role>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, role, None).await
    }

    pub async fn post(&self, uri: &str, role: Option<Role>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, role, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, role: Option<Role>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, role, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, role: Option<Role>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, role, None).await
    }

    /// Create a project as the admin and return its id.
    pub async fn create_project(&self, body: Value) -> String {
        let (status, json) = self.post("/api/projects", Some(Role::Admin), body).await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create an RFI as `role` and return the created RFI.
    pub async fn create_rfi(&self, role: Role, project_id: &str, title: &str) -> Value {
        let (status, json) = self
            .post(
                "/api/rfis",
                Some(role),
                json!({
                    "projectId": project_id,
                    "title": title,
                    "description": "Confirm the slab edge detail at grid line C.",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        json["data"].clone()
    }

    /// Stored `rfis` row by id.
    pub fn rfi_row(&self, id: &str) -> Value {
        self.deps
            .backend
            .rows(Table::Rfis)
            .into_iter()
            .find(|row| row["id"] == id)
            .unwrap()
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        TestHarness::new().await
    }

    async fn teardown(self) {}
}

pub fn sample_project() -> Value {
    json!({
        "name": "Harbor View Tower",
        "contractNumber": "HV-2024-001",
        "clientCompany": "Harbor Holdings",
        "pmEmail": "pm@harbor.example.com",
        "recipients": ["architect@harbor.example.com", "engineer@harbor.example.com"],
        "disciplines": ["Structural", "Mechanical"],
    })
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn to_row<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}
