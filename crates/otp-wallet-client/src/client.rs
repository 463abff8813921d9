//! otp-wallet HTTP client implementation.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    AddBalanceRequest, ApiErrorResponse, Approval, AuthResponse, BalanceRequest, BalanceResponse,
    CreateTicketRequest, FederatedAuthRequest, IsAdminResponse, LoginRequest, Otp, OtpPurchase,
    RegisterRequest, RejectRequest, RequestOtpRequest, RespondRequest, SetAdminRequest,
    SupportTicket, TransactionPage, User,
};

/// otp-wallet API client.
///
/// Unauthenticated until a session token is attached with [`WalletClient::with_token`].
#[derive(Debug, Clone)]
pub struct WalletClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl WalletClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the service (e.g., `"http://otp-wallet:8080"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl AsRef<str>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.as_ref().trim_end_matches('/'))
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL cannot have paths: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach a session token to every subsequent request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The attached session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Register a new account. The response carries a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.send(Method::POST, &["register"], Some(request)).await
    }

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest { username, password };
        self.send(Method::POST, &["login"], Some(&request)).await
    }

    /// Log in with an identity provider ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    pub async fn federated_login(&self, id_token: &str) -> Result<AuthResponse, ClientError> {
        let request = FederatedAuthRequest { id_token };
        self.send(Method::POST, &["federated-auth"], Some(&request))
            .await
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.send(Method::POST, &["logout"], None::<&()>).await?;
        Ok(())
    }

    /// Get the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.send(Method::GET, &["user"], None::<&()>).await
    }

    /// Whether the logged-in user is an admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn is_admin(&self) -> Result<bool, ClientError> {
        let response: IsAdminResponse = self
            .send(Method::GET, &["user", "is-admin"], None::<&()>)
            .await?;
        Ok(response.is_admin)
    }

    // ------------------------------------------------------------------
    // Wallet
    // ------------------------------------------------------------------

    /// Get the wallet balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn wallet_balance(&self) -> Result<BalanceResponse, ClientError> {
        self.send(Method::GET, &["wallet-balance"], None::<&()>)
            .await
    }

    /// List ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<TransactionPage, ClientError> {
        let mut url = self.endpoint(&["transactions"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let response = self.authorize(self.client.get(url)).send().await?;
        handle_response(response).await
    }

    /// Submit a deposit for review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn add_balance(
        &self,
        amount_paise: i64,
        utr_number: &str,
    ) -> Result<BalanceRequest, ClientError> {
        let request = AddBalanceRequest {
            amount_paise,
            utr_number,
        };
        self.send(Method::POST, &["add-balance"], Some(&request))
            .await
    }

    /// List the logged-in user's deposits.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn balance_requests(&self) -> Result<Vec<BalanceRequest>, ClientError> {
        self.send(Method::GET, &["balance-requests"], None::<&()>)
            .await
    }

    // ------------------------------------------------------------------
    // OTPs
    // ------------------------------------------------------------------

    /// Buy an OTP for an app.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientBalance`] if the wallet cannot cover `price_paise`.
    pub async fn request_otp(
        &self,
        app_name: &str,
        price_paise: i64,
    ) -> Result<OtpPurchase, ClientError> {
        let request = RequestOtpRequest {
            app_name,
            price_paise,
        };
        self.send(Method::POST, &["request-otp"], Some(&request))
            .await
    }

    /// Latest unused OTP for an app.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if there is none.
    pub async fn active_otp(&self, app_name: &str) -> Result<Otp, ClientError> {
        self.send(Method::GET, &["active-otp", app_name], None::<&()>)
            .await
    }

    /// All OTPs of the logged-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn otps(&self) -> Result<Vec<Otp>, ClientError> {
        self.send(Method::GET, &["otps"], None::<&()>).await
    }

    // ------------------------------------------------------------------
    // Support
    // ------------------------------------------------------------------

    /// Open a support ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_ticket(
        &self,
        subject: &str,
        message: &str,
    ) -> Result<SupportTicket, ClientError> {
        let request = CreateTicketRequest { subject, message };
        self.send(Method::POST, &["support-tickets"], Some(&request))
            .await
    }

    /// The logged-in user's tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn my_tickets(&self) -> Result<Vec<SupportTicket>, ClientError> {
        self.send(Method::GET, &["user", "support-tickets"], None::<&()>)
            .await
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    /// All deposits, newest first. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn all_balance_requests(&self) -> Result<Vec<BalanceRequest>, ClientError> {
        self.send(Method::GET, &["admin", "balance-requests"], None::<&()>)
            .await
    }

    /// Deposits awaiting review. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn pending_balance_requests(&self) -> Result<Vec<BalanceRequest>, ClientError> {
        self.send(
            Method::GET,
            &["admin", "balance-requests", "pending"],
            None::<&()>,
        )
        .await
    }

    /// Approve a deposit and credit the owner. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn approve_balance_request(&self, id: &str) -> Result<Approval, ClientError> {
        self.send(
            Method::POST,
            &["admin", "balance-requests", id, "approve"],
            None::<&()>,
        )
        .await
    }

    /// Reject a deposit with a reason. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn reject_balance_request(
        &self,
        id: &str,
        reason: &str,
    ) -> Result<BalanceRequest, ClientError> {
        let request = RejectRequest { reason };
        self.send(
            Method::POST,
            &["admin", "balance-requests", id, "reject"],
            Some(&request),
        )
        .await
    }

    /// All tickets. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn all_tickets(&self) -> Result<Vec<SupportTicket>, ClientError> {
        self.send(Method::GET, &["support-tickets"], None::<&()>)
            .await
    }

    /// Open tickets. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn open_tickets(&self) -> Result<Vec<SupportTicket>, ClientError> {
        self.send(Method::GET, &["support-tickets", "open"], None::<&()>)
            .await
    }

    /// Answer and close a ticket. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn respond_to_ticket(
        &self,
        id: &str,
        response: &str,
    ) -> Result<SupportTicket, ClientError> {
        let request = RespondRequest { response };
        self.send(
            Method::POST,
            &["support-tickets", id, "respond"],
            Some(&request),
        )
        .await
    }

    /// All admins. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn admins(&self) -> Result<Vec<User>, ClientError> {
        self.send(Method::GET, &["admin", "admins"], None::<&()>)
            .await
    }

    /// Grant or revoke admin rights. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<User, ClientError> {
        let request = SetAdminRequest { is_admin };
        self.send(
            Method::POST,
            &["admin", "users", user_id, "admin"],
            Some(&request),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Build `{base}/api/{segments..}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base URL cannot have paths".to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "Sending request");

        let mut builder = self.authorize(self.client.request(method, url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        handle_response(response).await
    }
}

/// Handle API response and convert errors.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    // Try to parse error response
    let error_body: Result<ApiErrorResponse, _> = response.json().await;

    match error_body {
        Ok(api_error) => {
            let code = api_error.error.code.as_str();
            let message = api_error.error.message;

            // Map specific error codes to typed errors
            match code {
                "insufficient_balance" => {
                    let detail = |key: &str| {
                        api_error
                            .error
                            .details
                            .as_ref()
                            .and_then(|d| d.get(key))
                            .and_then(serde_json::Value::as_i64)
                            .unwrap_or(0)
                    };

                    Err(ClientError::InsufficientBalance {
                        balance: detail("balance"),
                        required: detail("required"),
                    })
                }
                "not_found" => Err(ClientError::NotFound { message }),
                "unauthorized" => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Api {
                    code: code.to_string(),
                    message,
                    status: status.as_u16(),
                }),
            }
        }
        Err(_) => Err(ClientError::Api {
            code: "unknown".to_string(),
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        }),
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl ClientOptions {
    /// Create options with a request timeout.
    #[must_use]
    pub fn with_timeout(timeout_seconds: u64) -> Self {
        Self { timeout_seconds }
    }
}
