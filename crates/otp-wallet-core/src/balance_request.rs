//! Manual deposit verification.
//!
//! A user claims an out-of-band UPI payment by submitting its UTR reference.
//! An admin checks the reference and either approves the request, which
//! credits the wallet, or rejects it with a reason.
//!
//! ```text
//! pending --approve--> approved
//! pending --reject---> rejected
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::{BalanceRequestId, UserId};

/// Smallest deposit that can be claimed, in paise (₹50).
pub const MIN_DEPOSIT_PAISE: i64 = 5_000;

/// Largest deposit that can be claimed in one request, in paise (₹10,00,000).
pub const MAX_DEPOSIT_PAISE: i64 = 100_000_000;

/// Minimum UTR reference length.
pub const MIN_UTR_LEN: usize = 10;

/// Maximum UTR reference length.
pub const MAX_UTR_LEN: usize = 30;

/// A user-submitted deposit claim awaiting admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Request ID.
    pub id: BalanceRequestId,

    /// The user claiming the deposit.
    pub user_id: UserId,

    /// Claimed amount in paise.
    pub amount_paise: i64,

    /// UTR payment reference.
    pub utr_number: String,

    /// Review status.
    pub status: RequestStatus,

    /// Admin who approved or rejected the request.
    pub reviewed_by: Option<UserId>,

    /// When the request was approved or rejected.
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Why the request was rejected.
    pub rejection_reason: Option<String>,

    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

impl BalanceRequest {
    /// Build a pending request after validating amount and reference.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidInput` if the amount is outside
    /// [`MIN_DEPOSIT_PAISE`]..=[`MAX_DEPOSIT_PAISE`] or the UTR length is out
    /// of bounds.
    pub fn submit(user_id: UserId, amount_paise: i64, utr_number: &str) -> Result<Self> {
        if amount_paise < MIN_DEPOSIT_PAISE {
            return Err(WalletError::InvalidInput(format!(
                "Amount must be at least {MIN_DEPOSIT_PAISE} paise"
            )));
        }
        if amount_paise > MAX_DEPOSIT_PAISE {
            return Err(WalletError::InvalidInput(format!(
                "Amount must be at most {MAX_DEPOSIT_PAISE} paise"
            )));
        }

        let utr_number = utr_number.trim();
        let utr_len = utr_number.chars().count();
        if !(MIN_UTR_LEN..=MAX_UTR_LEN).contains(&utr_len) {
            return Err(WalletError::InvalidInput(format!(
                "UTR number must be {MIN_UTR_LEN} to {MAX_UTR_LEN} characters"
            )));
        }

        Ok(Self {
            id: BalanceRequestId::generate(),
            user_id,
            amount_paise,
            utr_number: utr_number.to_string(),
            status: RequestStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: Utc::now(),
        })
    }

    /// Mark the request approved.
    ///
    /// Crediting the wallet and writing the ledger entry is the store's job;
    /// this only performs the state transition.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidState` unless the request is pending.
    pub fn approve(&mut self, admin_id: UserId) -> Result<()> {
        self.ensure_pending()?;
        self.status = RequestStatus::Approved;
        self.reviewed_by = Some(admin_id);
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    /// Mark the request rejected, storing the reason verbatim.
    ///
    /// # Errors
    ///
    /// - `WalletError::InvalidInput` if the reason is blank.
    /// - `WalletError::InvalidState` unless the request is pending.
    pub fn reject(&mut self, admin_id: UserId, reason: &str) -> Result<()> {
        if reason.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "Rejection reason is required".into(),
            ));
        }
        self.ensure_pending()?;
        self.status = RequestStatus::Rejected;
        self.reviewed_by = Some(admin_id);
        self.reviewed_at = Some(Utc::now());
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.status == RequestStatus::Pending {
            Ok(())
        } else {
            Err(WalletError::InvalidState(format!(
                "Balance request {} is already {}",
                self.id,
                self.status.as_str()
            )))
        }
    }
}

/// Review status of a balance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for an admin.
    Pending,

    /// Approved and credited.
    Approved,

    /// Rejected with a reason.
    Rejected,
}

impl RequestStatus {
    /// Stable lowercase name used in API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> BalanceRequest {
        BalanceRequest::submit(UserId::generate(), 5_000, "UTR1234567").unwrap()
    }

    #[test]
    fn submit_validates_amount() {
        let user_id = UserId::generate();
        assert!(BalanceRequest::submit(user_id, 4_999, "UTR1234567").is_err());
        assert!(BalanceRequest::submit(user_id, 5_000, "UTR1234567").is_ok());
        assert!(BalanceRequest::submit(user_id, MAX_DEPOSIT_PAISE, "UTR1234567").is_ok());
        assert!(matches!(
            BalanceRequest::submit(user_id, MAX_DEPOSIT_PAISE + 1, "UTR1234567"),
            Err(WalletError::InvalidInput(_))
        ));
        assert!(BalanceRequest::submit(user_id, i64::MAX, "UTR1234567").is_err());
    }

    #[test]
    fn submit_validates_utr_length() {
        let user_id = UserId::generate();
        assert!(BalanceRequest::submit(user_id, 5_000, "123456789").is_err());
        assert!(BalanceRequest::submit(user_id, 5_000, &"9".repeat(31)).is_err());
        assert!(BalanceRequest::submit(user_id, 5_000, &"9".repeat(30)).is_ok());
    }

    #[test]
    fn approve_once() {
        let admin = UserId::generate();
        let mut request = pending();

        request.approve(admin).unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.reviewed_by, Some(admin));
        assert!(request.reviewed_at.is_some());

        let err = request.approve(admin).unwrap_err();
        assert!(matches!(err, WalletError::InvalidState(_)));
    }

    #[test]
    fn reject_stores_reason_verbatim() {
        let mut request = pending();
        request.reject(UserId::generate(), "Invalid UTR").unwrap();

        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.rejection_reason.as_deref(), Some("Invalid UTR"));
    }

    #[test]
    fn reject_requires_reason() {
        let mut request = pending();
        let err = request.reject(UserId::generate(), "").unwrap_err();

        assert!(matches!(err, WalletError::InvalidInput(_)));
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn terminal_states_are_immutable() {
        let admin = UserId::generate();
        let mut request = pending();
        request.reject(admin, "Duplicate").unwrap();

        assert!(matches!(
            request.approve(admin),
            Err(WalletError::InvalidState(_))
        ));
        assert!(matches!(
            request.reject(admin, "Again"),
            Err(WalletError::InvalidState(_))
        ));
        assert_eq!(request.rejection_reason.as_deref(), Some("Duplicate"));
    }
}
