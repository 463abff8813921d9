//! Wallet balance and ledger handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use otp_wallet_core::{format_paise, Transaction};
use otp_wallet_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance in paise.
    pub balance_paise: i64,
    /// Balance formatted in rupees.
    pub balance_formatted: String,
}

impl BalanceResponse {
    pub(crate) fn new(balance_paise: i64) -> Self {
        Self {
            balance_paise,
            balance_formatted: format_paise(balance_paise),
        }
    }
}

/// Get current wallet balance.
pub async fn wallet_balance(auth: AuthUser) -> Json<BalanceResponse> {
    Json(BalanceResponse::new(auth.user.balance_paise))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Transaction kind (`deposit` or `otp_purchase`).
    pub kind: String,
    /// Amount in paise (positive = credit, negative = debit).
    pub amount_paise: i64,
    /// Amount formatted in rupees.
    pub amount_formatted: String,
    /// Balance after this transaction.
    pub balance_after_paise: i64,
    /// Description.
    pub description: String,
    /// App the OTP was bought for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// UTR of the approved deposit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utr_number: Option<String>,
    /// Balance request that produced the deposit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_request_id: Option<String>,
    /// Timestamp.
    pub created_at: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            kind: tx.kind.as_str().to_string(),
            amount_paise: tx.amount_paise,
            amount_formatted: format_paise(tx.amount_paise),
            balance_after_paise: tx.balance_after_paise,
            description: tx.description.clone(),
            app_name: tx.app_name.clone(),
            utr_number: tx.utr_number.clone(),
            balance_request_id: tx.balance_request_id.map(|id| id.to_string()),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions =
        state
            .store
            .list_transactions_by_user(&auth.user.id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}
