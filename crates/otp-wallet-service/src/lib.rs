//! otp-wallet HTTP API Service.
//!
//! This crate provides the HTTP API for the otp-wallet service, including:
//!
//! - Registration, login and sessions
//! - Wallet balance and ledger history
//! - Deposit (balance request) submission and admin review
//! - OTP purchase and lookup
//! - Support tickets
//!
//! # Authentication
//!
//! Logins mint an opaque session token, accepted as `Authorization: Bearer`
//! or as the `sid` cookie. Accounts can also be created or entered through
//! an external identity provider whose RS256 ID tokens are checked against
//! its JWKS.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Store calls are synchronous but handlers are async

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod state;

pub use config::{IdentityConfig, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
