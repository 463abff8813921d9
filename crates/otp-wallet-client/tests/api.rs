//! Client tests against a mocked otp-wallet server.

use otp_wallet_client::{ClientError, RegisterRequest, WalletClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": "6b1d0f3e-8c2a-4f4e-9a7d-2f1e5c3b9a10",
        "username": "asha",
        "name": "Asha",
        "balance_paise": 7_000,
        "balance_formatted": "₹70.00",
        "is_admin": false,
        "created_at": "2026-01-05T10:00:00Z"
    })
}

fn transaction_json() -> serde_json::Value {
    json!({
        "id": "01HZX3J6Q8N4Y2B7C5D9E1F0GH",
        "kind": "otp_purchase",
        "amount_paise": -3_000,
        "amount_formatted": "-₹30.00",
        "balance_after_paise": 7_000,
        "description": "OTP for WhatsApp",
        "app_name": "WhatsApp",
        "created_at": "2026-01-05T10:05:00Z"
    })
}

#[tokio::test]
async fn register_sends_form_and_returns_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({
            "username": "asha",
            "password": "secret123",
            "confirm_password": "secret123",
            "name": "Asha"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": user_json(),
            "token": "deadbeef",
            "expires_at": "2026-01-06T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap();
    let auth = client
        .register(&RegisterRequest {
            username: "asha".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
            name: "Asha".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(auth.token, "deadbeef");
    assert_eq!(auth.user.username, "asha");
    assert_eq!(auth.user.balance_paise, 7_000);
}

#[tokio::test]
async fn token_is_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/wallet-balance"))
        .and(header("authorization", "Bearer deadbeef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balance_paise": 7_000,
            "balance_formatted": "₹70.00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri())
        .unwrap()
        .with_token("deadbeef");
    let balance = client.wallet_balance().await.unwrap();

    assert_eq!(balance.balance_paise, 7_000);
    assert_eq!(balance.balance_formatted, "₹70.00");
}

#[tokio::test]
async fn request_otp_returns_purchase() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/request-otp"))
        .and(body_json(json!({ "app_name": "WhatsApp", "price_paise": 3_000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "app_name": "WhatsApp",
            "transaction": transaction_json(),
            "balance": { "balance_paise": 7_000, "balance_formatted": "₹70.00" }
        })))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("t");
    let purchase = client.request_otp("WhatsApp", 3_000).await.unwrap();

    assert!(purchase.success);
    assert_eq!(purchase.transaction.amount_paise, -3_000);
    assert_eq!(purchase.transaction.app_name.as_deref(), Some("WhatsApp"));
    assert!(purchase.transaction.utr_number.is_none());
    assert_eq!(purchase.balance.balance_paise, 7_000);
}

#[tokio::test]
async fn insufficient_balance_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/request-otp"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "code": "insufficient_balance",
                "message": "Insufficient balance",
                "details": { "balance": 2_000, "required": 3_000 }
            }
        })))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("t");
    let err = client.request_otp("WhatsApp", 3_000).await.unwrap_err();

    match err {
        ClientError::InsufficientBalance { balance, required } => {
            assert_eq!(balance, 2_000);
            assert_eq!(required, 3_000);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_otp_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/active-otp/Google%20Pay"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "not_found", "message": "No active OTP for Google Pay" }
        })))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("t");
    let err = client.active_otp("Google Pay").await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "unauthorized", "message": "unauthorized" }
        })))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("stale");
    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn other_errors_keep_code_and_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/api/admin/balance-requests/01HZX3J6Q8N4Y2B7C5D9E1F0GH/approve",
        ))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "conflict", "message": "Request already approved" }
        })))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("admin");
    let err = client
        .approve_balance_request("01HZX3J6Q8N4Y2B7C5D9E1F0GH")
        .await
        .unwrap_err();

    match err {
        ClientError::Api {
            code,
            message,
            status,
        } => {
            assert_eq!(code, "conflict");
            assert_eq!(message, "Request already approved");
            assert_eq!(status, 409);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_body_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/otps"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("t");
    let err = client.otps().await.unwrap_err();

    match err {
        ClientError::Api { code, status, .. } => {
            assert_eq!(code, "unknown");
            assert_eq!(status, 502);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transactions_pass_paging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/transactions"))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactions": [transaction_json()],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("t");
    let page = client.transactions(1, 2).await.unwrap();

    assert_eq!(page.transactions.len(), 1);
    assert!(page.has_more);
}

#[tokio::test]
async fn reject_sends_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/balance-requests/r1/reject"))
        .and(body_json(json!({ "reason": "Invalid UTR" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "user_id": "6b1d0f3e-8c2a-4f4e-9a7d-2f1e5c3b9a10",
            "amount_paise": 5_000,
            "amount_formatted": "₹50.00",
            "utr_number": "UTR1234567890",
            "status": "rejected",
            "reviewed_by": "admin",
            "reviewed_at": "2026-01-05T11:00:00Z",
            "rejection_reason": "Invalid UTR",
            "created_at": "2026-01-05T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WalletClient::new(server.uri()).unwrap().with_token("admin");
    let request = client
        .reject_balance_request("r1", "Invalid UTR")
        .await
        .unwrap();

    assert_eq!(request.status, "rejected");
    assert_eq!(request.rejection_reason.as_deref(), Some("Invalid UTR"));
}
