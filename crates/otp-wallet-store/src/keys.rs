//! Key encoding utilities for `RocksDB`.
//!
//! Record keys are the 16 raw bytes of their ULID, so forward iteration is
//! chronological. Per-user index keys prefix the record key with the 16 UUID
//! bytes of the owner.

use otp_wallet_core::UserId;

/// Length of a UUID or ULID in bytes.
const ID_LEN: usize = 16;

/// Separator between the app name and the OTP id in OTP index keys.
const APP_TERMINATOR: u8 = 0x00;

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a username index key.
#[must_use]
pub fn username_key(username: &str) -> Vec<u8> {
    username.as_bytes().to_vec()
}

/// Create a session key from its token.
#[must_use]
pub fn session_key(token: &str) -> Vec<u8> {
    token.as_bytes().to_vec()
}

/// Create a record key from ULID bytes.
#[must_use]
pub fn record_key(id_bytes: [u8; 16]) -> Vec<u8> {
    id_bytes.to_vec()
}

/// Create a user index key.
///
/// Format: `user_id (16 bytes) || record_id (16 bytes)`
#[must_use]
pub fn user_index_key(user_id: &UserId, id_bytes: [u8; 16]) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LEN * 2);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&id_bytes);
    key
}

/// Create a prefix for iterating all index entries of a user.
#[must_use]
pub fn user_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an OTP index key.
///
/// Format: `user_id (16 bytes) || app_name || 0x00 || otp_id (16 bytes)`
///
/// App names never contain control characters, so the terminator keeps one
/// app's prefix from matching another app whose name extends it.
#[must_use]
pub fn otp_index_key(user_id: &UserId, app_name: &str, otp_id: [u8; 16]) -> Vec<u8> {
    let mut key = otp_app_prefix(user_id, app_name);
    key.extend_from_slice(&otp_id);
    key
}

/// Create a prefix for iterating a user's OTPs for one app.
#[must_use]
pub fn otp_app_prefix(user_id: &UserId, app_name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LEN + app_name.len() + 1 + ID_LEN);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(app_name.as_bytes());
    key.push(APP_TERMINATOR);
    key
}

/// Extract the trailing record id from an index key.
///
/// Returns `None` if the key is shorter than an id.
#[must_use]
pub fn trailing_id(key: &[u8]) -> Option<[u8; 16]> {
    let start = key.len().checked_sub(ID_LEN)?;
    key[start..].try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use otp_wallet_core::{OtpId, TransactionId};

    #[test]
    fn user_index_key_format() {
        let user_id = UserId::generate();
        let tx_id = TransactionId::generate();
        let key = user_index_key(&user_id, tx_id.to_bytes());

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], user_id.as_bytes());
        assert_eq!(&key[16..], tx_id.to_bytes());
        assert!(key.starts_with(&user_prefix(&user_id)));
    }

    #[test]
    fn trailing_id_extracts_record() {
        let user_id = UserId::generate();
        let otp_id = OtpId::generate();
        let key = otp_index_key(&user_id, "WhatsApp", otp_id.to_bytes());

        assert_eq!(trailing_id(&key), Some(otp_id.to_bytes()));
        assert_eq!(trailing_id(&[1, 2, 3]), None);
    }

    #[test]
    fn otp_prefix_does_not_match_longer_app_names() {
        let user_id = UserId::generate();
        let key = otp_index_key(&user_id, "Xbox", OtpId::generate().to_bytes());

        assert!(key.starts_with(&otp_app_prefix(&user_id, "Xbox")));
        assert!(!key.starts_with(&otp_app_prefix(&user_id, "X")));
    }
}
