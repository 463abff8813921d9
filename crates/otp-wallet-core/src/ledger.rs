//! Ledger transactions.
//!
//! Every change to a wallet balance creates an immutable transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BalanceRequestId, TransactionId, UserId};

/// A ledger entry recording one balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Kind of balance change.
    pub kind: TransactionKind,

    /// Amount in paise. Positive = credit, negative = debit.
    pub amount_paise: i64,

    /// Balance after this transaction (in paise).
    pub balance_after_paise: i64,

    /// Human-readable description.
    pub description: String,

    /// App the OTP was bought for (purchases only).
    pub app_name: Option<String>,

    /// UTR payment reference (deposits only).
    pub utr_number: Option<String>,

    /// Balance request this deposit settles (deposits only).
    pub balance_request_id: Option<BalanceRequestId>,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a deposit transaction for an approved balance request.
    #[must_use]
    pub fn deposit(
        user_id: UserId,
        amount_paise: i64,
        balance_after_paise: i64,
        utr_number: String,
        balance_request_id: BalanceRequestId,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            kind: TransactionKind::Deposit,
            amount_paise: amount_paise.abs(),
            balance_after_paise,
            description: "Wallet Deposit (Approved)".to_string(),
            app_name: None,
            utr_number: Some(utr_number),
            balance_request_id: Some(balance_request_id),
            created_at: Utc::now(),
        }
    }

    /// Create an OTP purchase transaction (debit).
    #[must_use]
    pub fn otp_purchase(
        user_id: UserId,
        price_paise: i64,
        balance_after_paise: i64,
        app_name: &str,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            kind: TransactionKind::OtpPurchase,
            amount_paise: -price_paise.abs(),
            balance_after_paise,
            description: format!("OTP for {app_name}"),
            app_name: Some(app_name.to_string()),
            utr_number: None,
            balance_request_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds added through an approved balance request.
    Deposit,

    /// Funds spent on an OTP.
    OtpPurchase,
}

impl TransactionKind {
    /// Stable lowercase name used in API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::OtpPurchase => "otp_purchase",
        }
    }

    /// Check if this kind adds funds.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit)
    }
}
