//! Core types and utilities for otp-wallet.
//!
//! This crate provides the domain types used throughout the otp-wallet service:
//!
//! - **Identifiers**: `UserId`, `TransactionId`, `BalanceRequestId`, `OtpId`, `TicketId`
//! - **Users**: `User` with its wallet balance and admin flag
//! - **Ledger**: `Transaction`, `TransactionKind`
//! - **Deposits**: `BalanceRequest`, `RequestStatus`
//! - **OTPs**: `OtpRecord` and code generation
//! - **Support**: `SupportTicket`, `TicketStatus`
//! - **Sessions**: `Session`
//!
//! # Money
//!
//! All amounts are integer paise (`i64`), 1 rupee = 100 paise.
//! A ₹50 deposit is `5000`; an OTP priced at ₹2.50 is `250`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod balance_request;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod otp;
pub mod session;
pub mod ticket;
pub mod user;

pub use balance_request::{
    BalanceRequest, RequestStatus, MAX_DEPOSIT_PAISE, MAX_UTR_LEN, MIN_DEPOSIT_PAISE, MIN_UTR_LEN,
};
pub use error::{Result, WalletError};
pub use ids::{BalanceRequestId, IdError, OtpId, TicketId, TransactionId, UserId};
pub use ledger::{Transaction, TransactionKind};
pub use money::format_paise;
pub use otp::{OtpRecord, MIN_OTP_PRICE_PAISE};
pub use session::{Session, DEFAULT_SESSION_TTL_HOURS};
pub use ticket::{SupportTicket, TicketStatus, MIN_TICKET_MESSAGE_LEN};
pub use user::{User, MIN_PASSWORD_LEN};
