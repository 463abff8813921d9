//! Deposit (balance request) handlers.
//!
//! Users submit a request after paying offline; an admin approves it, which
//! credits the wallet, or rejects it with a reason.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use otp_wallet_core::{format_paise, BalanceRequest, BalanceRequestId, RequestStatus};
use otp_wallet_store::Store;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::wallet::{BalanceResponse, TransactionResponse};
use crate::state::AppState;

/// Balance request response.
#[derive(Debug, Serialize)]
pub struct BalanceRequestResponse {
    /// Request ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Requested amount in paise.
    pub amount_paise: i64,
    /// Requested amount formatted in rupees.
    pub amount_formatted: String,
    /// Payment reference.
    pub utr_number: String,
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    /// Reviewing admin.
    pub reviewed_by: Option<String>,
    /// Review time.
    pub reviewed_at: Option<String>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Submission time.
    pub created_at: String,
}

impl From<&BalanceRequest> for BalanceRequestResponse {
    fn from(request: &BalanceRequest) -> Self {
        Self {
            id: request.id.to_string(),
            user_id: request.user_id.to_string(),
            amount_paise: request.amount_paise,
            amount_formatted: format_paise(request.amount_paise),
            utr_number: request.utr_number.clone(),
            status: request.status.as_str().to_string(),
            reviewed_by: request.reviewed_by.map(|id| id.to_string()),
            reviewed_at: request.reviewed_at.map(|at| at.to_rfc3339()),
            rejection_reason: request.rejection_reason.clone(),
            created_at: request.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(requests: &[BalanceRequest]) -> Vec<BalanceRequestResponse> {
    requests.iter().map(BalanceRequestResponse::from).collect()
}

/// Add balance request.
#[derive(Debug, Deserialize)]
pub struct AddBalanceRequest {
    /// Amount in paise (at least 5000).
    pub amount_paise: i64,
    /// Payment reference (10 to 30 characters).
    pub utr_number: String,
}

/// Submit a deposit for admin review.
pub async fn add_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<AddBalanceRequest>,
) -> Result<(StatusCode, Json<BalanceRequestResponse>), ApiError> {
    let balance_request =
        BalanceRequest::submit(auth.user.id, request.amount_paise, &request.utr_number)?;

    state.store.put_balance_request(&balance_request)?;

    tracing::info!(
        request_id = %balance_request.id,
        user_id = %auth.user.id,
        amount_paise = balance_request.amount_paise,
        "Balance request submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(BalanceRequestResponse::from(&balance_request)),
    ))
}

/// List the current user's balance requests.
pub async fn list_own(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<BalanceRequestResponse>>, ApiError> {
    let requests = state.store.list_balance_requests_by_user(&auth.user.id)?;
    Ok(Json(to_responses(&requests)))
}

/// List all balance requests.
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<BalanceRequestResponse>>, ApiError> {
    let requests = state.store.list_balance_requests(None)?;
    Ok(Json(to_responses(&requests)))
}

/// List pending balance requests.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<BalanceRequestResponse>>, ApiError> {
    let requests = state
        .store
        .list_balance_requests(Some(RequestStatus::Pending))?;
    Ok(Json(to_responses(&requests)))
}

/// Approval response.
#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    /// The approved request.
    pub request: BalanceRequestResponse,
    /// The deposit written to the ledger.
    pub transaction: TransactionResponse,
    /// The owner's balance after the credit.
    pub balance: BalanceResponse,
}

/// Approve a pending request and credit the owner's wallet.
pub async fn approve(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(request_id): Path<String>,
) -> Result<Json<ApproveResponse>, ApiError> {
    let request_id = parse_request_id(&request_id)?;

    let approval = state
        .store
        .approve_balance_request(&request_id, &admin.user().id)?;

    tracing::info!(
        request_id = %request_id,
        admin_id = %admin.user().id,
        user_id = %approval.request.user_id,
        amount_paise = approval.request.amount_paise,
        balance_paise = approval.balance_paise,
        "Balance request approved"
    );

    Ok(Json(ApproveResponse {
        request: BalanceRequestResponse::from(&approval.request),
        transaction: TransactionResponse::from(&approval.transaction),
        balance: BalanceResponse::new(approval.balance_paise),
    }))
}

/// Rejection request.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason shown to the user; must not be blank.
    pub reason: String,
}

/// Reject a pending request. The wallet is not touched.
pub async fn reject(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(request_id): Path<String>,
    ApiJson(body): ApiJson<RejectRequest>,
) -> Result<Json<BalanceRequestResponse>, ApiError> {
    let request_id = parse_request_id(&request_id)?;

    let request = state
        .store
        .reject_balance_request(&request_id, &admin.user().id, &body.reason)?;

    tracing::info!(
        request_id = %request_id,
        admin_id = %admin.user().id,
        reason = %body.reason,
        "Balance request rejected"
    );

    Ok(Json(BalanceRequestResponse::from(&request)))
}

fn parse_request_id(raw: &str) -> Result<BalanceRequestId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid balance request id: {raw}")))
}
