//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, balance_requests, health, otp, support, wallet};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for login endpoints.
/// Password hashing is CPU-bound, so these get a tighter limit.
const AUTH_MAX_CONCURRENT_REQUESTS: usize = 16;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /api/register` - Create an account and log in
/// - `POST /api/login` - Log in with username and password
/// - `POST /api/federated-auth` - Log in with an identity provider ID token
///
/// ## User (session auth)
/// - `POST /api/logout` - End the session
/// - `GET /api/user` - Current user
/// - `GET /api/user/is-admin` - Admin flag of the current user
/// - `GET /api/wallet-balance` - Wallet balance
/// - `GET /api/transactions` - Ledger history
/// - `POST /api/add-balance` - Submit a deposit for review
/// - `GET /api/balance-requests` - Own deposits
/// - `POST /api/request-otp` - Buy an OTP
/// - `GET /api/active-otp/:app_name` - Latest unused OTP for an app
/// - `GET /api/otps` - Own OTPs
/// - `POST /api/support-tickets` - Open a ticket
/// - `GET /api/user/support-tickets` - Own tickets
///
/// ## Admin (session auth + admin flag)
/// - `GET /api/admin/balance-requests` - All deposits
/// - `GET /api/admin/balance-requests/pending` - Pending deposits
/// - `POST /api/admin/balance-requests/:id/approve` - Approve and credit
/// - `POST /api/admin/balance-requests/:id/reject` - Reject with reason
/// - `GET /api/support-tickets` - All tickets
/// - `GET /api/support-tickets/open` - Open tickets
/// - `POST /api/support-tickets/:id/respond` - Answer and close
/// - `GET /api/admin/admins` - Admin users
/// - `POST /api/admin/users/:id/admin` - Grant or revoke admin
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/federated-auth", post(auth::federated_auth))
        .layer(ConcurrencyLimitLayer::new(AUTH_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Session
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
        .route("/user/is-admin", get(auth::is_admin))
        // Wallet
        .route("/wallet-balance", get(wallet::wallet_balance))
        .route("/transactions", get(wallet::list_transactions))
        // Deposits
        .route("/add-balance", post(balance_requests::add_balance))
        .route("/balance-requests", get(balance_requests::list_own))
        .route("/admin/balance-requests", get(balance_requests::list_all))
        .route(
            "/admin/balance-requests/pending",
            get(balance_requests::list_pending),
        )
        .route(
            "/admin/balance-requests/:id/approve",
            post(balance_requests::approve),
        )
        .route(
            "/admin/balance-requests/:id/reject",
            post(balance_requests::reject),
        )
        // OTPs
        .route("/request-otp", post(otp::request_otp))
        .route("/active-otp/:app_name", get(otp::active_otp))
        .route("/otps", get(otp::list_otps))
        // Support
        .route(
            "/support-tickets",
            post(support::create_ticket).get(support::list_all),
        )
        .route("/support-tickets/open", get(support::list_open))
        .route("/support-tickets/:id/respond", post(support::respond))
        .route("/user/support-tickets", get(support::list_own))
        // Admin users
        .route("/admin/admins", get(admin::list_admins))
        .route("/admin/users/:id/admin", post(admin::set_admin))
        .merge(auth_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
