//! OTP purchase integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::{json, Value};

async fn buy(harness: &TestHarness, auth: &str, app: &str, price_paise: i64) -> axum_test::TestResponse {
    harness
        .server
        .post("/api/request-otp")
        .add_header("authorization", auth.to_string())
        .json(&json!({ "app_name": app, "price_paise": price_paise }))
        .await
}

#[tokio::test]
async fn purchase_debits_and_exposes_code() {
    let harness = TestHarness::new();
    let auth = harness.user_auth_header("asha").await;
    harness.fund("asha", 100);

    let response = buy(&harness, &auth, "X", 30).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["balance"]["balance_paise"], 70);
    assert_eq!(body["transaction"]["kind"], "otp_purchase");
    assert_eq!(body["transaction"]["amount_paise"], -30);
    assert_eq!(body["transaction"]["description"], "OTP for X");

    assert_eq!(harness.balance(&auth).await, 70);

    let active = harness
        .server
        .get("/api/active-otp/X")
        .add_header("authorization", auth.clone())
        .await;
    active.assert_status_ok();
    let otp: Value = active.json();
    let code = otp["otp_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    let value: u32 = code.parse().unwrap();
    assert!((100_000..=999_999).contains(&value));
    assert_eq!(otp["app_name"], "X");
}

#[tokio::test]
async fn insufficient_balance_is_payment_required() {
    let harness = TestHarness::new();
    let auth = harness.user_auth_header("asha").await;
    harness.fund("asha", 20);

    let response = buy(&harness, &auth, "Telegram", 30).await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
    assert_eq!(body["error"]["details"]["balance"], 20);
    assert_eq!(body["error"]["details"]["required"], 30);

    assert_eq!(harness.balance(&auth).await, 20);

    harness
        .server
        .get("/api/active-otp/Telegram")
        .add_header("authorization", auth)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn purchase_validates_input() {
    let harness = TestHarness::new();
    let auth = harness.user_auth_header("asha").await;
    harness.fund("asha", 10_000);

    buy(&harness, &auth, "   ", 100)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    buy(&harness, &auth, "WhatsApp", 9)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let missing_price = harness
        .server
        .post("/api/request-otp")
        .add_header("authorization", auth.clone())
        .json(&json!({ "app_name": "WhatsApp" }))
        .await;
    missing_price.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = missing_price.json();
    assert_eq!(body["error"]["code"], "bad_request");

    assert_eq!(harness.balance(&auth).await, 10_000);
}

#[tokio::test]
async fn otps_are_private_to_their_owner() {
    let harness = TestHarness::new();
    let asha = harness.user_auth_header("asha").await;
    let ravi = harness.user_auth_header("ravi").await;
    harness.fund("asha", 1_000);

    buy(&harness, &asha, "WhatsApp", 100).await.assert_status_ok();

    harness
        .server
        .get("/api/active-otp/WhatsApp")
        .add_header("authorization", ravi.clone())
        .await
        .assert_status_not_found();

    let listed = harness
        .server
        .get("/api/otps")
        .add_header("authorization", ravi)
        .await;
    listed.assert_status_ok();
    let listed: Value = listed.json();
    assert!(listed.as_array().unwrap().is_empty());

    let own = harness
        .server
        .get("/api/otps")
        .add_header("authorization", asha)
        .await;
    own.assert_status_ok();
    let own: Value = own.json();
    assert_eq!(own.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_purchases_each_debit() {
    let harness = TestHarness::new();
    let auth = harness.user_auth_header("asha").await;
    harness.fund("asha", 250);

    buy(&harness, &auth, "WhatsApp", 100).await.assert_status_ok();
    buy(&harness, &auth, "WhatsApp", 100).await.assert_status_ok();
    buy(&harness, &auth, "WhatsApp", 100)
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);

    assert_eq!(harness.balance(&auth).await, 50);

    let ledger = harness
        .server
        .get("/api/transactions?limit=1")
        .add_header("authorization", auth)
        .await;
    ledger.assert_status_ok();
    let ledger: Value = ledger.json();
    assert_eq!(ledger["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(ledger["has_more"], true);
    assert_eq!(ledger["transactions"][0]["balance_after_paise"], 50);
}

#[tokio::test]
async fn malformed_paging_is_bad_request() {
    let harness = TestHarness::new();
    let auth = harness.user_auth_header("asha").await;

    for query in ["limit=abc", "offset=-1"] {
        let response = harness
            .server
            .get(&format!("/api/transactions?{query}"))
            .add_header("authorization", auth.clone())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "bad_request");
    }
}
