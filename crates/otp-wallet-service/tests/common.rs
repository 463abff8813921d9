//! Common test utilities for otp-wallet integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use otp_wallet_service::{create_router, AppState, ServiceConfig};
use otp_wallet_store::{RocksStore, Store};

/// Username promoted to admin by the test configuration.
pub const ADMIN_USERNAME: &str = "admin";

/// Password used for every test account.
pub const PASSWORD: &str = "secret123";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for arranging state.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test harness, adjusting the default test configuration first.
    pub fn with_config(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            admin_usernames: vec![ADMIN_USERNAME.into()],
            ..ServiceConfig::default()
        };
        configure(&mut config);

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Register a user and return the login response body.
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .server
            .post("/api/register")
            .json(&json!({
                "username": username,
                "password": PASSWORD,
                "confirm_password": PASSWORD,
                "name": format!("{username} name"),
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }

    /// Register a user and return the bearer header for it.
    pub async fn user_auth_header(&self, username: &str) -> String {
        let body = self.register(username).await;
        bearer(&body)
    }

    /// Register the configured admin and return its bearer header.
    pub async fn admin_auth_header(&self) -> String {
        self.user_auth_header(ADMIN_USERNAME).await
    }

    /// Set a user's balance directly in the store.
    pub fn fund(&self, username: &str, balance_paise: i64) {
        let user = self
            .store
            .get_user_by_username(username)
            .expect("store read failed")
            .expect("user not registered");
        self.store
            .set_balance(&user.id, balance_paise)
            .expect("set balance failed");
    }

    /// Read a user's balance through the API.
    pub async fn balance(&self, auth_header: &str) -> i64 {
        let response = self
            .server
            .get("/api/wallet-balance")
            .add_header("authorization", auth_header.to_string())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["balance_paise"].as_i64().expect("balance missing")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a bearer header from a login response body.
pub fn bearer(login_body: &Value) -> String {
    format!(
        "Bearer {}",
        login_body["token"].as_str().expect("token missing")
    )
}
