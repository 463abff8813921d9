//! OTP records.
//!
//! An OTP here is a locally generated six digit code, paid for from the
//! wallet. Nothing is sent over any messaging network.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::{OtpId, UserId};

/// Smallest accepted OTP price in paise (₹0.10).
pub const MIN_OTP_PRICE_PAISE: i64 = 10;

/// Lowest generated code.
pub const OTP_CODE_MIN: u32 = 100_000;

/// Highest generated code.
pub const OTP_CODE_MAX: u32 = 999_999;

/// A purchased OTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Record ID (ULID, so later records sort after earlier ones).
    pub id: OtpId,

    /// Owner.
    pub user_id: UserId,

    /// App the code was bought for.
    pub app_name: String,

    /// Six ASCII digits.
    pub code: String,

    /// Never set by any workflow; lookups still filter on it.
    pub is_used: bool,

    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Issue a new unused record with a freshly generated code.
    #[must_use]
    pub fn issue(user_id: UserId, app_name: &str) -> Self {
        Self {
            id: OtpId::generate(),
            user_id,
            app_name: app_name.to_string(),
            code: generate_code(&mut rand::thread_rng()),
            is_used: false,
            created_at: Utc::now(),
        }
    }
}

/// Generate a uniformly random code in `[100000, 999999]`.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(OTP_CODE_MIN..=OTP_CODE_MAX).to_string()
}

/// Validate an OTP purchase request.
///
/// App names are used inside storage keys, so control characters are refused.
///
/// # Errors
///
/// Returns `WalletError::InvalidInput` for an empty app name or a price
/// below [`MIN_OTP_PRICE_PAISE`].
pub fn validate_purchase(app_name: &str, price_paise: i64) -> Result<()> {
    if app_name.trim().is_empty() {
        return Err(WalletError::InvalidInput("App name is required".into()));
    }
    if app_name.chars().any(char::is_control) {
        return Err(WalletError::InvalidInput(
            "App name contains invalid characters".into(),
        ));
    }
    if price_paise < MIN_OTP_PRICE_PAISE {
        return Err(WalletError::InvalidInput(format!(
            "Price must be at least {MIN_OTP_PRICE_PAISE} paise"
        )));
    }
    Ok(())
}
