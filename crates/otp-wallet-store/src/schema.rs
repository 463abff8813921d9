//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Index: username to `user_id`. Enforces username uniqueness.
    pub const USERNAMES: &str = "usernames";

    /// Login sessions, keyed by token.
    pub const SESSIONS: &str = "sessions";

    /// Ledger transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by user, keyed by `user_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Balance requests, keyed by `request_id` (ULID).
    pub const BALANCE_REQUESTS: &str = "balance_requests";

    /// Index: balance requests by user, keyed by `user_id || request_id`.
    pub const BALANCE_REQUESTS_BY_USER: &str = "balance_requests_by_user";

    /// OTP records, keyed by `otp_id` (ULID).
    pub const OTPS: &str = "otps";

    /// Index: OTPs by user and app, keyed by `user_id || app_name || 0x00 || otp_id`.
    pub const OTPS_BY_USER_APP: &str = "otps_by_user_app";

    /// Support tickets, keyed by `ticket_id` (ULID).
    pub const SUPPORT_TICKETS: &str = "support_tickets";

    /// Index: support tickets by user, keyed by `user_id || ticket_id`.
    pub const SUPPORT_TICKETS_BY_USER: &str = "support_tickets_by_user";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::USERNAMES,
        cf::SESSIONS,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::BALANCE_REQUESTS,
        cf::BALANCE_REQUESTS_BY_USER,
        cf::OTPS,
        cf::OTPS_BY_USER_APP,
        cf::SUPPORT_TICKETS,
        cf::SUPPORT_TICKETS_BY_USER,
    ]
}
