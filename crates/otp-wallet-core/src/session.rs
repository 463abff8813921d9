//! Login sessions.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// A login session, identified by an opaque random token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Hex-encoded random token presented by the client.
    pub token: String,

    /// The authenticated user.
    pub user_id: UserId,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session stops authenticating.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user_id` lasting `ttl`.
    #[must_use]
    pub fn start(user_id: UserId, ttl: Duration) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let now = Utc::now();
        Self {
            token: hex::encode(bytes),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_random_hex() {
        let user_id = UserId::generate();
        let a = Session::start(user_id, Duration::hours(1));
        let b = Session::start(user_id, Duration::hours(1));

        assert_eq!(a.token.len(), TOKEN_BYTES * 2);
        assert!(a.token.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn expiry() {
        let session = Session::start(UserId::generate(), Duration::hours(24));
        assert!(!session.is_expired_at(Utc::now()));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(Utc::now() + Duration::hours(25)));
    }
}
