//! Registration, login and session handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use otp_wallet_core::user::validate_registration;
use otp_wallet_core::{format_paise, Session, User};
use otp_wallet_store::{Store, StoreError};

use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::password::{hash_password, unusable_password_hash, verify_password};
use crate::state::AppState;

/// Public view of a user. The password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Wallet balance in paise.
    pub balance_paise: i64,
    /// Wallet balance formatted in rupees.
    pub balance_formatted: String,
    /// Whether the user is an admin.
    pub is_admin: bool,
    /// Registration time.
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            name: user.name.clone(),
            balance_paise: user.balance_paise,
            balance_formatted: format_paise(user.balance_paise),
            is_admin: user.is_admin,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response to a successful login of any kind.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The logged-in user.
    pub user: UserResponse,
    /// Session token, also set as the `sid` cookie.
    pub token: String,
    /// When the session expires.
    pub expires_at: String,
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
    /// Display name.
    pub name: String,
}

/// Register a new account and log it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    validate_registration(
        &request.username,
        &request.password,
        &request.confirm_password,
        &request.name,
    )?;

    let username = request.username.trim().to_string();
    let password_hash = hash_password(&request.password)?;
    let user = User::new(username, password_hash, request.name.trim().to_string());

    state.store.create_user(&user)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let user = promote_if_listed(&state, user)?;
    start_session(&state, &user, StatusCode::CREATED)
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Log in with a username and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = state
        .store
        .get_user_by_username(request.username.trim())?
        .filter(|user| verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| {
            tracing::debug!(username = %request.username, "Login failed");
            ApiError::Unauthorized
        })?;

    tracing::info!(user_id = %user.id, "User logged in");

    let user = promote_if_listed(&state, user)?;
    start_session(&state, &user, StatusCode::OK)
}

/// Federated login request.
#[derive(Debug, Deserialize)]
pub struct FederatedAuthRequest {
    /// ID token issued by the identity provider.
    pub id_token: String,
}

/// Log in with an identity provider's ID token, creating the account on first use.
pub async fn federated_auth(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<FederatedAuthRequest>,
) -> Result<Response, ApiError> {
    let verifier = state.identity.as_ref().ok_or_else(|| {
        ApiError::ExternalService("Identity provider not configured".into())
    })?;

    let claims = verifier.verify(&request.id_token).await?;

    let username = claims
        .email
        .clone()
        .filter(|email| !email.trim().is_empty())
        .unwrap_or_else(|| claims.sub.clone());

    let user = match state.store.get_user_by_username(&username)? {
        Some(user) => user,
        None => {
            let name = claims.name.clone().unwrap_or_else(|| username.clone());
            let user = User::new(username.clone(), unusable_password_hash()?, name);

            match state.store.create_user(&user) {
                Ok(()) => {
                    tracing::info!(user_id = %user.id, username = %user.username, "Federated user created");
                    user
                }
                // Lost a race with a concurrent first login
                Err(StoreError::Duplicate { .. }) => state
                    .store
                    .get_user_by_username(&username)?
                    .ok_or_else(|| ApiError::Internal("federated user vanished".into()))?,
                Err(e) => return Err(e.into()),
            }
        }
    };

    tracing::info!(user_id = %user.id, subject = %claims.sub, "Federated login");

    let user = promote_if_listed(&state, user)?;
    start_session(&state, &user, StatusCode::OK)
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true.
    pub logged_out: bool,
}

/// End the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    state.store.delete_session(&auth.session_token)?;

    tracing::info!(user_id = %auth.user.id, "User logged out");

    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    Ok((
        [(SET_COOKIE, clear)],
        Json(LogoutResponse { logged_out: true }),
    )
        .into_response())
}

/// Get the current user.
pub async fn current_user(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

/// Admin check response.
#[derive(Debug, Serialize)]
pub struct IsAdminResponse {
    /// Whether the current user is an admin.
    pub is_admin: bool,
}

/// Report whether the current user is an admin.
pub async fn is_admin(auth: AuthUser) -> Json<IsAdminResponse> {
    Json(IsAdminResponse {
        is_admin: auth.user.is_admin,
    })
}

/// Grant the admin flag to users named in the configured admin list.
fn promote_if_listed(state: &AppState, user: User) -> Result<User, ApiError> {
    if user.is_admin || !state.config.is_admin_username(&user.username) {
        return Ok(user);
    }

    tracing::info!(user_id = %user.id, username = %user.username, "Promoting configured admin");
    Ok(state.store.set_admin(&user.id, true)?)
}

/// Create a session and build the login response with its cookie.
fn start_session(state: &AppState, user: &User, status: StatusCode) -> Result<Response, ApiError> {
    let session = Session::start(user.id, state.session_ttl());
    state.store.put_session(&session)?;

    let max_age = (session.expires_at - session.created_at).num_seconds();
    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        session.token
    );

    let body = AuthResponse {
        user: UserResponse::from(user),
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    };

    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}
