//! Admin user management handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use otp_wallet_core::UserId;
use otp_wallet_store::Store;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::auth::UserResponse;
use crate::state::AppState;

/// List all admin users.
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let admins = state.store.list_admins()?;
    Ok(Json(admins.iter().map(UserResponse::from).collect()))
}

/// Set admin flag request.
#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    /// New value of the flag.
    pub is_admin: bool,
}

/// Grant or revoke the admin flag on a user.
pub async fn set_admin(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<SetAdminRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user id: {user_id}")))?;

    if user_id == admin.user().id && !body.is_admin {
        return Err(ApiError::Conflict("Admins cannot revoke their own access".into()));
    }

    let user = state.store.set_admin(&user_id, body.is_admin)?;

    tracing::info!(
        user_id = %user_id,
        admin_id = %admin.user().id,
        is_admin = body.is_admin,
        "Admin flag updated"
    );

    Ok(Json(UserResponse::from(&user)))
}
