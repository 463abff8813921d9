//! Support ticket integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};

#[tokio::test]
async fn ticket_lifecycle() {
    let harness = TestHarness::new();
    let user = harness.user_auth_header("asha").await;
    let admin = harness.admin_auth_header().await;

    let created = harness
        .server
        .post("/api/support-tickets")
        .add_header("authorization", user.clone())
        .json(&json!({ "subject": "Payment", "message": "My deposit has not arrived yet" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let ticket: Value = created.json();
    assert_eq!(ticket["status"], "open");
    let id = ticket["id"].as_str().unwrap();

    let open = harness
        .server
        .get("/api/support-tickets/open")
        .add_header("authorization", admin.clone())
        .await;
    open.assert_status_ok();
    let open: Value = open.json();
    assert_eq!(open.as_array().unwrap().len(), 1);

    let responded = harness
        .server
        .post(&format!("/api/support-tickets/{id}/respond"))
        .add_header("authorization", admin.clone())
        .json(&json!({ "response": "Credited, please check" }))
        .await;
    responded.assert_status_ok();
    let closed: Value = responded.json();
    assert_eq!(closed["status"], "closed");
    assert_eq!(closed["response"], "Credited, please check");

    let again = harness
        .server
        .post(&format!("/api/support-tickets/{id}/respond"))
        .add_header("authorization", admin.clone())
        .json(&json!({ "response": "Second answer" }))
        .await;
    again.assert_status(StatusCode::CONFLICT);

    let mine = harness
        .server
        .get("/api/user/support-tickets")
        .add_header("authorization", user)
        .await;
    mine.assert_status_ok();
    let mine: Value = mine.json();
    assert_eq!(mine[0]["response"], "Credited, please check");

    let open = harness
        .server
        .get("/api/support-tickets/open")
        .add_header("authorization", admin.clone())
        .await;
    let open: Value = open.json();
    assert!(open.as_array().unwrap().is_empty());

    let all = harness
        .server
        .get("/api/support-tickets")
        .add_header("authorization", admin)
        .await;
    all.assert_status_ok();
    let all: Value = all.json();
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn short_message_is_rejected() {
    let harness = TestHarness::new();
    let user = harness.user_auth_header("asha").await;

    let response = harness
        .server
        .post("/api/support-tickets")
        .add_header("authorization", user)
        .json(&json!({ "subject": "Help", "message": "too short" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_all_tickets_needs_admin() {
    let harness = TestHarness::new();
    let user = harness.user_auth_header("asha").await;

    harness
        .server
        .get("/api/support-tickets")
        .add_header("authorization", user)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    harness
        .server
        .get("/api/support-tickets")
        .await
        .assert_status_unauthorized();
}
