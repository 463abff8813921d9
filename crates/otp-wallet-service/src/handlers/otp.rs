//! OTP purchase and lookup handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use otp_wallet_core::OtpRecord;
use otp_wallet_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::wallet::{BalanceResponse, TransactionResponse};
use crate::state::AppState;

/// OTP purchase request.
#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    /// App the code is for.
    pub app_name: String,
    /// Price in paise (at least 10).
    pub price_paise: i64,
}

/// OTP purchase response.
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    /// Always true on success.
    pub success: bool,
    /// The app the code was issued for.
    pub app_name: String,
    /// The debit written to the ledger.
    pub transaction: TransactionResponse,
    /// Balance after the debit.
    pub balance: BalanceResponse,
}

/// Buy an OTP for an app, debiting the wallet.
///
/// The code itself is fetched separately through the active OTP endpoint.
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<RequestOtpRequest>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    let app_name = request.app_name.trim();

    let purchase = state
        .store
        .purchase_otp(&auth.user.id, app_name, request.price_paise)
        .map_err(|e| {
            tracing::debug!(user_id = %auth.user.id, app_name, error = %e, "OTP purchase refused");
            e
        })?;

    tracing::info!(
        user_id = %auth.user.id,
        otp_id = %purchase.otp.id,
        app_name,
        price_paise = request.price_paise,
        balance_paise = purchase.balance_paise,
        "OTP purchased"
    );

    Ok(Json(RequestOtpResponse {
        success: true,
        app_name: purchase.otp.app_name.clone(),
        transaction: TransactionResponse::from(&purchase.transaction),
        balance: BalanceResponse::new(purchase.balance_paise),
    }))
}

/// OTP record response.
#[derive(Debug, Serialize)]
pub struct OtpResponse {
    /// OTP ID.
    pub id: String,
    /// App the code is for.
    pub app_name: String,
    /// Six-digit code.
    pub otp_code: String,
    /// Whether the code has been consumed.
    pub is_used: bool,
    /// Issue time.
    pub timestamp: String,
}

impl From<&OtpRecord> for OtpResponse {
    fn from(otp: &OtpRecord) -> Self {
        Self {
            id: otp.id.to_string(),
            app_name: otp.app_name.clone(),
            otp_code: otp.code.clone(),
            is_used: otp.is_used,
            timestamp: otp.created_at.to_rfc3339(),
        }
    }
}

/// Get the most recent unused OTP for an app.
pub async fn active_otp(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(app_name): Path<String>,
) -> Result<Json<OtpResponse>, ApiError> {
    let otp = state
        .store
        .latest_otp(&auth.user.id, app_name.trim())?
        .ok_or_else(|| ApiError::NotFound(format!("No active OTP for {app_name}")))?;

    Ok(Json(OtpResponse::from(&otp)))
}

/// List the current user's OTPs.
pub async fn list_otps(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<OtpResponse>>, ApiError> {
    let otps = state.store.list_otps_by_user(&auth.user.id)?;
    Ok(Json(otps.iter().map(OtpResponse::from).collect()))
}
