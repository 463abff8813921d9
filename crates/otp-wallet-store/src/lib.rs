//! `RocksDB` storage layer for otp-wallet.
//!
//! This crate provides persistent storage for users, sessions, the ledger,
//! balance requests, OTP records and support tickets using `RocksDB` with
//! column families for indexing.
//!
//! # Atomicity
//!
//! Workflow steps that touch more than one record (approving a deposit,
//! buying an OTP) are compound operations on the [`Store`] trait. Each one
//! reads, checks and writes under a store-wide lock and commits through a
//! single `WriteBatch`, so a wallet is never credited without its ledger
//! entry and two concurrent debits cannot overwrite each other.
//!
//! # Example
//!
//! ```no_run
//! use otp_wallet_store::{RocksStore, Store};
//! use otp_wallet_core::User;
//!
//! let store = RocksStore::open("/tmp/otp-wallet-db").unwrap();
//!
//! let user = User::new("asha".into(), "$argon2id$...".into(), "Asha".into());
//! store.create_user(&user).unwrap();
//!
//! let retrieved = store.get_user_by_username("asha").unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use otp_wallet_core::{
    BalanceRequest, BalanceRequestId, OtpRecord, RequestStatus, Session, SupportTicket,
    TicketId, TicketStatus, Transaction, TransactionId, User, UserId,
};

/// Outcome of approving a balance request.
#[derive(Debug, Clone)]
pub struct Approval {
    /// The request, now approved.
    pub request: BalanceRequest,
    /// The deposit written to the ledger.
    pub transaction: Transaction,
    /// Wallet balance after the credit, in paise.
    pub balance_paise: i64,
}

/// Outcome of buying an OTP.
#[derive(Debug, Clone)]
pub struct OtpPurchase {
    /// The issued OTP.
    pub otp: OtpRecord,
    /// The debit written to the ledger.
    pub transaction: Transaction,
    /// Wallet balance after the debit, in paise.
    pub balance_paise: i64,
}

/// The storage trait defining all database operations.
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the username is taken.
    fn create_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Overwrite a user's balance.
    ///
    /// This is an administrative correction; workflows use the compound
    /// operations below instead.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn set_balance(&self, user_id: &UserId, balance_paise: i64) -> Result<User>;

    /// Grant or revoke the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn set_admin(&self, user_id: &UserId, is_admin: bool) -> Result<User>;

    /// List every user with the admin flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_admins(&self) -> Result<Vec<User>>;

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Store a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_session(&self, session: &Session) -> Result<()>;

    /// Get a session by token. Expired sessions are returned as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_session(&self, token: &str) -> Result<Option<Session>>;

    /// Delete a session. Deleting an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete_session(&self, token: &str) -> Result<()>;

    /// Delete every session that has expired at `now`. Returns how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Append a ledger transaction.
    ///
    /// This also maintains the user index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>>;

    /// List transactions for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>>;

    // =========================================================================
    // Balance Request Operations
    // =========================================================================

    /// Insert a new balance request.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_balance_request(&self, request: &BalanceRequest) -> Result<()>;

    /// Get a balance request by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_balance_request(&self, request_id: &BalanceRequestId)
        -> Result<Option<BalanceRequest>>;

    /// List balance requests, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_balance_requests(&self, status: Option<RequestStatus>)
        -> Result<Vec<BalanceRequest>>;

    /// List a user's balance requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_balance_requests_by_user(&self, user_id: &UserId) -> Result<Vec<BalanceRequest>>;

    /// Approve a pending request, credit the wallet and append the deposit atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request or its user doesn't exist.
    /// - `StoreError::Rule(WalletError::InvalidState)` if the request is not pending.
    fn approve_balance_request(
        &self,
        request_id: &BalanceRequestId,
        admin_id: &UserId,
    ) -> Result<Approval>;

    /// Reject a pending request with a reason. The wallet is not touched.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request doesn't exist.
    /// - `StoreError::Rule(WalletError::InvalidInput)` for a blank reason.
    /// - `StoreError::Rule(WalletError::InvalidState)` if the request is not pending.
    fn reject_balance_request(
        &self,
        request_id: &BalanceRequestId,
        admin_id: &UserId,
        reason: &str,
    ) -> Result<BalanceRequest>;

    // =========================================================================
    // OTP Operations
    // =========================================================================

    /// Debit the wallet, append the purchase and issue an OTP atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user doesn't exist.
    /// - `StoreError::Rule(WalletError::InsufficientBalance)` if the balance is too low.
    fn purchase_otp(&self, user_id: &UserId, app_name: &str, price_paise: i64)
        -> Result<OtpPurchase>;

    /// Most recent unused OTP for a user and app, regardless of age.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn latest_otp(&self, user_id: &UserId, app_name: &str) -> Result<Option<OtpRecord>>;

    /// List all of a user's OTPs, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_otps_by_user(&self, user_id: &UserId) -> Result<Vec<OtpRecord>>;

    // =========================================================================
    // Support Ticket Operations
    // =========================================================================

    /// Insert a new support ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_ticket(&self, ticket: &SupportTicket) -> Result<()>;

    /// Get a support ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_ticket(&self, ticket_id: &TicketId) -> Result<Option<SupportTicket>>;

    /// List tickets, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<SupportTicket>>;

    /// List a user's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_tickets_by_user(&self, user_id: &UserId) -> Result<Vec<SupportTicket>>;

    /// Record an admin response and close the ticket.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the ticket doesn't exist.
    /// - `StoreError::Rule(WalletError::InvalidState)` if it is already closed.
    fn respond_to_ticket(
        &self,
        ticket_id: &TicketId,
        admin_id: &UserId,
        response: &str,
    ) -> Result<SupportTicket>;
}
