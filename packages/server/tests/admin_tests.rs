//! Integration tests for `POST /api/admin/invite-user`.

mod common;

use axum::http::{Method, StatusCode};
use common::TestHarness;
use rfi_core::common::Role;
use rfi_core::kernel::{AuthIdentity, BackendError, Table};
use serde_json::{json, Value};
use test_context::test_context;

fn invite_body(ctx: &TestHarness) -> Value {
    json!({
        "email": "New.Engineer@Example.com",
        "fullName": "Casey Engineer",
        "companyId": uuid::Uuid::now_v7().to_string(),
        "roleId": ctx.roles[&Role::Contractor].to_string(),
    })
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invite_records_invited_user(ctx: &TestHarness) {
    let users_before = ctx.deps.backend.rows(Table::Users).len();

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), invite_body(ctx))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["email"], "new.engineer@example.com");
    assert_eq!(json["data"]["status"], "invited");

    let invites = ctx.deps.auth.invites();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0].0, "new.engineer@example.com");
    assert_eq!(invites[0].1["full_name"], "Casey Engineer");

    let users = ctx.deps.backend.rows(Table::Users);
    assert_eq!(users.len(), users_before + 1);
    let invited = users.last().unwrap();
    assert_eq!(invited["status"], "invited");
    assert_eq!(invited["role_id"], ctx.roles[&Role::Contractor].to_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invite_without_role_is_missing_fields(ctx: &TestHarness) {
    let mut body = invite_body(ctx);
    body.as_object_mut().unwrap().remove("roleId");

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Missing required fields" }));
    assert!(ctx.deps.auth.invites().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invite_with_blank_field_is_missing_fields(ctx: &TestHarness) {
    let mut body = invite_body(ctx);
    body["fullName"] = json!("   ");

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invite_with_unknown_role_is_rejected(ctx: &TestHarness) {
    let mut body = invite_body(ctx);
    body["roleId"] = json!(uuid::Uuid::now_v7().to_string());

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), body)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Role not found" }));
    assert!(ctx.deps.auth.invites().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn refused_invitation_passes_reason_through(ctx: &TestHarness) {
    ctx.deps.auth.fail_invites_with(BackendError::Rejected {
        code: None,
        message: "User already registered".into(),
    });

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), invite_body(ctx))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "User already registered" }));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unreachable_auth_service_is_internal_error(ctx: &TestHarness) {
    ctx.deps
        .auth
        .fail_invites_with(BackendError::Network("connection reset".into()));

    let (status, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), invite_body(ctx))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Internal server error" }));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_admins_invite(ctx: &TestHarness) {
    let (status, json) = ctx
        .post(
            "/api/admin/invite-user",
            Some(Role::ProjectManager),
            invite_body(ctx),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "permission_denied");

    let (status, _) = ctx
        .post("/api/admin/invite-user", None, invite_body(ctx))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(ctx.deps.auth.invites().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invited_user_becomes_active_on_first_session(ctx: &TestHarness) {
    let (_, json) = ctx
        .post("/api/admin/invite-user", Some(Role::Admin), invite_body(ctx))
        .await;
    let user_id = json["data"]["id"].as_str().unwrap().to_string();

    ctx.deps.auth.add_session(
        "new-engineer-token",
        AuthIdentity {
            id: user_id.clone(),
            email: Some("new.engineer@example.com".into()),
            metadata: json!({}),
        },
    );
    let (status, json) = ctx
        .request_with_token(Method::GET, "/api/session", Some("new-engineer-token"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], json!({"state": "resolved", "role": "contractor"}));
    let row = ctx
        .deps
        .backend
        .rows(Table::Users)
        .into_iter()
        .find(|row| row["id"] == user_id.as_str())
        .unwrap();
    assert_eq!(row["status"], "active");
}
