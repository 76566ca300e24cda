//! Integration tests for `POST /api/export/pdf-previews`.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use rfi_core::common::Role;
use serde_json::json;
use test_context::test_context;

const INVALID_REQUEST: &str = "Invalid request: RFIs array is required";

fn rfi(id: &str, number: &str) -> serde_json::Value {
    json!({
        "id": id,
        "rfiNumber": number,
        "title": "Curtain wall anchor spacing",
        "description": "Anchors at **600mm** or 750mm?",
        "status": "open",
        "urgency": "urgent",
    })
}

#[test_context(TestHarness)]
#[tokio::test]
async fn previews_come_back_in_input_order(ctx: &TestHarness) {
    let (status, json) = ctx
        .post(
            "/api/export/pdf-previews",
            Some(Role::ViewOnly),
            json!({ "rfis": [rfi("a", "RFI-001"), rfi("b", "RFI-002")] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    let previews = json["previews"].as_array().unwrap();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0]["rfiId"], "a");
    assert_eq!(previews[0]["fileName"], "RFI-001.html");
    assert_eq!(previews[1]["rfiId"], "b");
    assert!(!previews[1]["content"].as_str().unwrap().is_empty());
    assert_eq!(ctx.deps.pdf_renderer.calls(), vec![2]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rfis_must_be_an_array(ctx: &TestHarness) {
    for body in [
        json!({ "rfis": "RFI-001" }),
        json!({ "rfis": { "id": "a" } }),
        json!({}),
        json!([rfi("a", "RFI-001")]),
    ] {
        let (status, json) = ctx
            .post("/api/export/pdf-previews", Some(Role::Contractor), body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": INVALID_REQUEST }));
    }
    assert!(ctx.deps.pdf_renderer.calls().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn non_json_body_is_invalid_request(ctx: &TestHarness) {
    let (status, json) = ctx
        .request(
            axum::http::Method::POST,
            "/api/export/pdf-previews",
            Some(Role::Contractor),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], INVALID_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn export_requires_sign_in(ctx: &TestHarness) {
    let (status, json) = ctx
        .post(
            "/api/export/pdf-previews",
            None,
            json!({ "rfis": [rfi("a", "RFI-001")] }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "authentication_required");
    assert!(ctx.deps.pdf_renderer.calls().is_empty());
}

#[tokio::test]
async fn renderer_failure_is_reported_generically() {
    let ctx = TestHarness::with_failing_renderer();

    let (status, json) = ctx
        .post(
            "/api/export/pdf-previews",
            Some(Role::ProjectManager),
            json!({ "rfis": [rfi("a", "RFI-001")] }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Failed to generate PDF previews" }));
    assert_eq!(ctx.deps.pdf_renderer.calls(), vec![1]);
}
