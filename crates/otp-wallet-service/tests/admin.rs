//! Admin user management integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};

#[tokio::test]
async fn grant_and_list_admins() {
    let harness = TestHarness::new();
    let admin = harness.admin_auth_header().await;
    let body = harness.register("ravi").await;
    let ravi_id = body["user"]["id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/api/admin/users/{ravi_id}/admin"))
        .add_header("authorization", admin.clone())
        .json(&json!({ "is_admin": true }))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["is_admin"], true);

    let admins = harness
        .server
        .get("/api/admin/admins")
        .add_header("authorization", admin)
        .await;
    admins.assert_status_ok();
    let admins: Value = admins.json();
    let names: Vec<_> = admins
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["admin", "ravi"]);

    // The promoted user can now reach admin routes
    harness
        .server
        .get("/api/admin/balance-requests")
        .add_header("authorization", common::bearer(&body))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn admin_cannot_revoke_self() {
    let harness = TestHarness::new();
    let body = harness.register(common::ADMIN_USERNAME).await;
    let admin_id = body["user"]["id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/api/admin/users/{admin_id}/admin"))
        .add_header("authorization", common::bearer(&body))
        .json(&json!({ "is_admin": false }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let harness = TestHarness::new();
    let admin = harness.admin_auth_header().await;

    let response = harness
        .server
        .post("/api/admin/users/7f1c9a4e-2b7d-4c1e-9a53-0c6f1f3e8d21/admin")
        .add_header("authorization", admin)
        .json(&json!({ "is_admin": true }))
        .await;

    response.assert_status_not_found();
}
