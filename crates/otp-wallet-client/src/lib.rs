//! otp-wallet Client SDK.
//!
//! Typed access to the otp-wallet HTTP API: accounts, deposits, OTP purchases
//! and support tickets, plus the admin review endpoints.
//!
//! # Example
//!
//! ```no_run
//! use otp_wallet_client::{ClientError, WalletClient};
//!
//! # async fn example() -> Result<(), ClientError> {
//! let auth = WalletClient::new("http://otp-wallet:8080")?
//!     .login("asha", "secret123")
//!     .await?;
//!
//! let client = WalletClient::new("http://otp-wallet:8080")?.with_token(auth.token);
//!
//! match client.request_otp("WhatsApp", 1_500).await {
//!     Ok(purchase) => println!("Balance left: {}", purchase.balance.balance_formatted),
//!     Err(ClientError::InsufficientBalance { balance, required }) => {
//!         println!("Need {required} paise, have {balance}");
//!     }
//!     Err(e) => return Err(e),
//! }
//!
//! let otp = client.active_otp("WhatsApp").await?;
//! println!("Code: {}", otp.otp_code);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, WalletClient};
pub use error::ClientError;
pub use types::*;
