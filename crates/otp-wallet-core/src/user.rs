//! User accounts and wallet balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::UserId;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user with a wallet.
///
/// The password hash is a PHC string produced by the service; it is never
/// serialized into API responses (see the service's `UserResponse`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    pub id: UserId,

    /// Unique login name (email for federated users).
    pub username: String,

    /// Password hash (PHC string format).
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// Wallet balance in paise.
    pub balance_paise: i64,

    /// Whether the user may use the admin console.
    pub is_admin: bool,

    /// When the user registered.
    pub created_at: DateTime<Utc>,

    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an empty wallet.
    #[must_use]
    pub fn new(username: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            username,
            password_hash,
            name,
            balance_paise: 0,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the wallet covers a debit of `amount_paise`.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount_paise: i64) -> bool {
        self.balance_paise >= amount_paise
    }

    /// Debit the wallet, refusing to go below zero.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InsufficientBalance` if the balance is too low.
    pub fn debit(&mut self, amount_paise: i64) -> Result<i64> {
        if !self.has_sufficient_balance(amount_paise) {
            return Err(WalletError::InsufficientBalance {
                balance: self.balance_paise,
                required: amount_paise,
            });
        }
        self.balance_paise -= amount_paise;
        self.updated_at = Utc::now();
        Ok(self.balance_paise)
    }

    /// Credit the wallet. Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidState` if the balance would overflow.
    pub fn credit(&mut self, amount_paise: i64) -> Result<i64> {
        let balance = self.balance_paise.checked_add(amount_paise).ok_or_else(|| {
            WalletError::InvalidState(format!(
                "Crediting {amount_paise} paise would overflow the wallet balance"
            ))
        })?;
        self.balance_paise = balance;
        self.updated_at = Utc::now();
        Ok(balance)
    }
}

/// Validate registration fields.
///
/// # Errors
///
/// Returns `WalletError::InvalidInput` describing the first failing field.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
    name: &str,
) -> Result<()> {
    if username.trim().is_empty() {
        return Err(WalletError::InvalidInput("Username is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WalletError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm_password {
        return Err(WalletError::InvalidInput("Passwords don't match".into()));
    }
    if name.trim().is_empty() {
        return Err(WalletError::InvalidInput("Name is required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_balance(balance: i64) -> User {
        let mut user = User::new("asha".into(), "hash".into(), "Asha".into());
        user.balance_paise = balance;
        user
    }

    #[test]
    fn new_user_has_empty_wallet() {
        let user = User::new("asha".into(), "hash".into(), "Asha".into());
        assert_eq!(user.balance_paise, 0);
        assert!(!user.is_admin);
    }

    #[test]
    fn debit_within_balance() {
        let mut user = user_with_balance(10_000);
        assert_eq!(user.debit(3_000).unwrap(), 7_000);
        assert_eq!(user.debit(7_000).unwrap(), 0);
    }

    #[test]
    fn debit_over_balance_leaves_wallet_untouched() {
        let mut user = user_with_balance(2_000);
        let err = user.debit(2_001).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientBalance {
                balance: 2_000,
                required: 2_001
            }
        );
        assert_eq!(user.balance_paise, 2_000);
    }

    #[test]
    fn credit_adds_to_balance() {
        let mut user = user_with_balance(100);
        assert_eq!(user.credit(5_000).unwrap(), 5_100);
    }

    #[test]
    fn credit_overflow_leaves_wallet_untouched() {
        let mut user = user_with_balance(i64::MAX - 10);
        let err = user.credit(11).unwrap_err();
        assert!(matches!(err, WalletError::InvalidState(_)));
        assert_eq!(user.balance_paise, i64::MAX - 10);

        assert_eq!(user.credit(10).unwrap(), i64::MAX);
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration("asha", "secret1", "secret1", "Asha").is_ok());
        assert!(validate_registration("", "secret1", "secret1", "Asha").is_err());
        assert!(validate_registration("asha", "short", "short", "Asha").is_err());
        assert!(validate_registration("asha", "secret1", "secret2", "Asha").is_err());
        assert!(validate_registration("asha", "secret1", "secret1", " ").is_err());
    }
}
