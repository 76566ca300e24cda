//! Integration tests for sessions, notices and the health check.

mod common;

use axum::http::StatusCode;
use common::{sample_project, TestHarness};
use rfi_core::common::Role;
use rfi_core::kernel::BackendError;
use serde_json::json;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn anonymous_session_is_signed_out(ctx: &TestHarness) {
    let (status, json) = ctx.get("/api/session", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"], serde_json::Value::Null);
    assert_eq!(json["data"]["role"], json!({ "state": "signed_out" }));
    assert_eq!(json["data"]["capabilities"], json!([]));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_token_is_anonymous(ctx: &TestHarness) {
    let (status, json) = ctx
        .request_with_token(axum::http::Method::GET, "/api/session", Some("expired"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], json!({ "state": "signed_out" }));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn session_lists_role_capabilities(ctx: &TestHarness) {
    let (status, json) = ctx.get("/api/session", Some(Role::Contractor)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"]["email"], "contractor@example.com");
    assert_eq!(
        json["data"]["role"],
        json!({ "state": "resolved", "role": "contractor" })
    );
    let capabilities = json["data"]["capabilities"].as_array().unwrap();
    assert!(capabilities.contains(&json!("create_rfi")));
    assert!(!capabilities.contains(&json!("update_rfi_status")));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn user_without_role_is_view_only(ctx: &TestHarness) {
    let (_, json) = ctx.get("/api/session", Some(Role::ViewOnly)).await;
    let view_only = json["data"]["capabilities"].clone();

    let user_id = rfi_core::common::UserId::new();
    ctx.deps.auth.add_session(
        "no-profile-token",
        rfi_core::kernel::AuthIdentity {
            id: user_id.to_string(),
            email: Some("stranger@example.com".into()),
            metadata: json!({ "full_name": "Sam Stranger" }),
        },
    );
    let (status, json) = ctx
        .request_with_token(
            axum::http::Method::GET,
            "/api/session",
            Some("no-profile-token"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["user"]["fullName"], "Sam Stranger");
    assert_eq!(
        json["data"]["role"],
        json!({ "state": "resolved", "role": "view_only" })
    );
    assert_eq!(json["data"]["capabilities"], view_only);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_session_reports_pending(ctx: &TestHarness) {
    ctx.deps
        .backend
        .fail_next(BackendError::Network("timeout".into()));

    let (status, json) = ctx.get("/api/session", Some(Role::Admin)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], json!({ "state": "pending" }));
    assert_eq!(json["data"]["capabilities"], json!([]));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn mutations_post_notices_that_can_be_dismissed(ctx: &TestHarness) {
    let project_id = ctx.create_project(sample_project()).await;
    let rfi = ctx.create_rfi(Role::Admin, &project_id, "Notify me").await;
    ctx.patch(
        &format!("/api/rfis/{}/status", rfi["id"].as_str().unwrap()),
        Some(Role::Admin),
        json!({ "status": "open" }),
    )
    .await;

    let (status, json) = ctx.get("/api/notices", Some(Role::Admin)).await;
    assert_eq!(status, StatusCode::OK);
    let notices = json["data"].as_array().unwrap().clone();
    let messages: Vec<&str> = notices
        .iter()
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["RFI-001 created", "This RFI is already open"]);
    assert_eq!(notices[0]["level"], "success");
    assert_eq!(notices[1]["level"], "error");

    // Notices belong to the user they were posted for.
    let (_, json) = ctx.get("/api/notices", Some(Role::ProjectManager)).await;
    assert_eq!(json["data"], json!([]));

    let id = notices[0]["id"].as_str().unwrap();
    let (status, _) = ctx
        .delete(&format!("/api/notices/{}", id), Some(Role::Admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx
        .delete(&format!("/api/notices/{}", id), Some(Role::Admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = ctx.get("/api/notices", Some(Role::Admin)).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sign_out_clears_notices(ctx: &TestHarness) {
    let project_id = ctx.create_project(sample_project()).await;
    ctx.create_rfi(Role::Contractor, &project_id, "Before sign-out").await;

    let (status, json) = ctx.delete("/api/session", Some(Role::Contractor)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], json!({ "state": "signed_out" }));

    let (_, json) = ctx.get("/api/notices", Some(Role::Contractor)).await;
    assert_eq!(json["data"], json!([]));

    let (status, _) = ctx.delete("/api/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn notices_require_sign_in(ctx: &TestHarness) {
    let (status, _) = ctx.get("/api/notices", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reflects_backend(ctx: &TestHarness) {
    let (status, json) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["backend"]["status"], "ok");

    ctx.deps
        .backend
        .fail_next(BackendError::Network("connection refused".into()));
    let (status, json) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unreachable_auth_service_leaves_handlers_in_charge(ctx: &TestHarness) {
    ctx.deps
        .auth
        .fail_sessions_with(BackendError::Network("connection refused".into()));

    let (status, json) = ctx.get("/api/session", Some(Role::Admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], json!({ "state": "pending" }));

    let (status, json) = ctx
        .post(
            "/api/admin/invite-user",
            Some(Role::Admin),
            json!({ "email": "casey@example.com", "fullName": "Casey" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Missing required fields" }));

    let (status, json) = ctx
        .post("/api/export/pdf-previews", Some(Role::Admin), json!({ "rfis": "all" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid request: RFIs array is required");

    // Guarded routes ask the caller to retry instead of to sign in.
    let (status, json) = ctx.get("/api/projects", Some(Role::Admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "role_pending");
}
