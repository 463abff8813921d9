//! Error types for otp-wallet domain rules.

use crate::ids::IdError;

/// Result type for otp-wallet domain operations.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Errors raised by domain validation and state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// Wallet balance is lower than the amount being debited.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance in paise.
        balance: i64,
        /// Required amount in paise.
        required: i64,
    },

    /// Input failed validation (length or numeric minimums).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The record is in a terminal state and cannot transition again.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
