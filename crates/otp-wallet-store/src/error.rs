//! Error types for otp-wallet storage.

use otp_wallet_core::WalletError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A unique key is already taken.
    #[error("{entity} already exists: {key}")]
    Duplicate {
        /// Kind of record.
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// A domain rule refused the operation (state transition, balance, validation).
    #[error(transparent)]
    Rule(#[from] WalletError),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
