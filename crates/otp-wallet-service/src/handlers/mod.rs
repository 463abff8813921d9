//! API handlers.

pub mod admin;
pub mod auth;
pub mod balance_requests;
pub mod health;
pub mod otp;
pub mod support;
pub mod wallet;
