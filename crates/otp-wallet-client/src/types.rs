//! Request and response types for the otp-wallet client.
//!
//! Amounts are integer paise throughout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

/// Registration request.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Password (at least 6 characters).
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FederatedAuthRequest<'a> {
    pub id_token: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddBalanceRequest<'a> {
    pub amount_paise: i64,
    pub utr_number: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RejectRequest<'a> {
    pub reason: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RequestOtpRequest<'a> {
    pub app_name: &'a str,
    pub price_paise: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateTicketRequest<'a> {
    pub subject: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RespondRequest<'a> {
    pub response: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SetAdminRequest {
    pub is_admin: bool,
}

// ============================================================================
// Responses
// ============================================================================

/// A user as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Wallet balance in paise.
    pub balance_paise: i64,
    /// Wallet balance formatted in rupees.
    pub balance_formatted: String,
    /// Whether the user is an admin.
    pub is_admin: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Response to register, login and federated login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// The logged-in user.
    pub user: User,
    /// Session token.
    pub token: String,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

/// Balance response.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    /// Balance in paise.
    pub balance_paise: i64,
    /// Balance formatted in rupees.
    pub balance_formatted: String,
}

/// A ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: String,
    /// `deposit` or `otp_purchase`.
    pub kind: String,
    /// Signed amount in paise.
    pub amount_paise: i64,
    /// Amount formatted in rupees.
    pub amount_formatted: String,
    /// Balance after this entry.
    pub balance_after_paise: i64,
    /// Description.
    pub description: String,
    /// App of an OTP purchase.
    #[serde(default)]
    pub app_name: Option<String>,
    /// UTR of a deposit.
    #[serde(default)]
    pub utr_number: Option<String>,
    /// Balance request behind a deposit.
    #[serde(default)]
    pub balance_request_id: Option<String>,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// Page of ledger entries.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPage {
    /// Transactions (newest first).
    pub transactions: Vec<Transaction>,
    /// Whether more transactions exist past this page.
    pub has_more: bool,
}

/// A deposit awaiting or past review.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceRequest {
    /// Request ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Amount in paise.
    pub amount_paise: i64,
    /// Amount formatted in rupees.
    pub amount_formatted: String,
    /// Payment reference.
    pub utr_number: String,
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    /// Reviewing admin.
    pub reviewed_by: Option<String>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Result of approving a deposit.
#[derive(Debug, Clone, Deserialize)]
pub struct Approval {
    /// The approved request.
    pub request: BalanceRequest,
    /// The ledger entry written.
    pub transaction: Transaction,
    /// The owner's new balance.
    pub balance: BalanceResponse,
}

/// Result of buying an OTP.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpPurchase {
    /// Always true.
    pub success: bool,
    /// App the OTP is for.
    pub app_name: String,
    /// The ledger entry written.
    pub transaction: Transaction,
    /// Balance after the debit.
    pub balance: BalanceResponse,
}

/// An issued OTP.
#[derive(Debug, Clone, Deserialize)]
pub struct Otp {
    /// OTP ID.
    pub id: String,
    /// App the code is for.
    pub app_name: String,
    /// Six-digit code.
    pub otp_code: String,
    /// Whether the code has been consumed.
    pub is_used: bool,
    /// Issue time.
    pub timestamp: DateTime<Utc>,
}

/// A support ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct SupportTicket {
    /// Ticket ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Subject line.
    pub subject: String,
    /// The user's message.
    pub message: String,
    /// `open` or `closed`.
    pub status: String,
    /// Admin response.
    pub response: Option<String>,
    /// Responding admin.
    pub responded_by: Option<String>,
    /// Response time.
    pub responded_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Admin check response.
#[derive(Debug, Clone, Deserialize)]
pub struct IsAdminResponse {
    /// Whether the current user is an admin.
    pub is_admin: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
