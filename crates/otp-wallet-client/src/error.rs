//! Client error types.

/// Errors that can occur when using the otp-wallet client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Wallet balance does not cover the purchase.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance in paise.
        balance: i64,
        /// Required amount in paise.
        required: i64,
    },

    /// The requested record does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Server message.
        message: String,
    },

    /// Missing, expired or rejected session.
    #[error("unauthorized")]
    Unauthorized,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
