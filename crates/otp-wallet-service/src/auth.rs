//! Authentication middleware and extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - End-user authentication via session token
//! - `AdminUser` - An authenticated user holding the admin flag
//!
//! and the `IdentityVerifier` used by federated login to check ID tokens
//! issued by an external identity provider. Expired sessions are swept in the
//! background by [`spawn_session_sweeper`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use otp_wallet_core::User;
use otp_wallet_store::{RocksStore, Store};

use crate::config::IdentityConfig;
use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Timeout for JWKS fetch requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A user authenticated by a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user record as loaded for this request.
    pub user: User,
    /// The session token that authenticated the request.
    pub session_token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = session_token(parts).ok_or(ApiError::Unauthorized)?;

            let session = state
                .store
                .get_session(&token)?
                .ok_or(ApiError::Unauthorized)?;

            if session.is_expired_at(Utc::now()) {
                tracing::debug!(user_id = %session.user_id, "Session expired");
                state.store.delete_session(&token)?;
                return Err(ApiError::Unauthorized);
            }

            let user = state
                .store
                .get_user(&session.user_id)?
                .ok_or(ApiError::Unauthorized)?;

            Ok(AuthUser {
                user,
                session_token: token,
            })
        })
    }
}

/// An authenticated user with the admin flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl AdminUser {
    /// The admin's user record.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0.user
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let auth = AuthUser::from_request_parts(parts, state).await?;

            if !auth.user.is_admin {
                tracing::warn!(user_id = %auth.user.id, "Admin access denied");
                return Err(ApiError::Forbidden);
            }

            Ok(AdminUser(auth))
        })
    }
}

/// Pull the session token from the bearer header, falling back to the cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Claims read from an identity provider's ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (provider-side user ID).
    pub sub: String,
    /// Email address, when the provider shares it.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, when the provider shares it.
    #[serde(default)]
    pub name: Option<String>,
    /// Audience (can be string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    #[serde(default)]
    pub iat: Option<i64>,
}

// ============================================================================
// JWKS Client and JWT Validation
// ============================================================================

/// JWKS (JSON Web Key Set) response structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of JWK keys.
    pub keys: Vec<Jwk>,
}

/// Single JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256").
    pub alg: Option<String>,
    /// RSA public key modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public key exponent (base64url encoded).
    pub e: Option<String>,
    /// Key use (e.g., "sig" for signature).
    #[serde(rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS cache entry.
struct JwksCache {
    /// Cached keys mapped by kid.
    keys: HashMap<String, DecodingKey>,
    /// Default key (for tokens without kid).
    default_key: Option<DecodingKey>,
    /// When the cache was last updated.
    last_updated: Instant,
}

impl JwksCache {
    fn new() -> Self {
        Self {
            keys: HashMap::new(),
            default_key: None,
            // Force initial fetch
            last_updated: Instant::now()
                .checked_sub(JWKS_CACHE_DURATION)
                .unwrap_or_else(Instant::now),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_updated.elapsed() >= JWKS_CACHE_DURATION
    }

    fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        match kid {
            Some(kid) => self.keys.get(kid).cloned(),
            None => self.default_key.clone(),
        }
    }
}

/// Verifies ID tokens against an identity provider's published keys.
pub struct IdentityVerifier {
    config: IdentityConfig,
    client: reqwest::Client,
    cache: RwLock<JwksCache>,
}

impl IdentityVerifier {
    /// Create a verifier for the given provider.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            client,
            cache: RwLock::new(JwksCache::new()),
        }
    }

    /// Validate an RS256 ID token and return its claims.
    ///
    /// Signature, expiry, audience and issuer are all checked.
    pub async fn verify(&self, token: &str) -> Result<IdTokenClaims, ApiError> {
        // Decode the header to get the key ID
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode ID token header");
            ApiError::Unauthorized
        })?;

        let decoding_key = self.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
                tracing::debug!(error = %e, "ID token validation failed");
                ApiError::Unauthorized
            })?;

        Ok(token_data.claims)
    }

    /// Get a decoding key from cache or fetch from the JWKS endpoint.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, ApiError> {
        {
            let cache = self.cache.read().await;
            if !cache.is_expired() {
                if let Some(key) = cache.lookup(kid) {
                    return Ok(key);
                }
            }
        }

        // Cache miss or expired
        let jwks = self.fetch_jwks().await?;

        let mut cache = self.cache.write().await;
        cache.keys.clear();
        cache.default_key = None;
        cache.last_updated = Instant::now();

        for jwk in &jwks.keys {
            if let Some(decoding_key) = jwk_to_decoding_key(jwk) {
                if let Some(ref key_kid) = jwk.kid {
                    cache.keys.insert(key_kid.clone(), decoding_key.clone());
                }
                if cache.default_key.is_none() {
                    cache.default_key = Some(decoding_key);
                }
            }
        }

        cache.lookup(kid).ok_or(ApiError::Unauthorized)
    }

    async fn fetch_jwks(&self) -> Result<Jwks, ApiError> {
        let jwks_url = self.config.jwks_url();

        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let response = self.client.get(&jwks_url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %jwks_url, "Failed to fetch JWKS");
            ApiError::ExternalService("Failed to fetch authentication keys".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                url = %jwks_url,
                "JWKS fetch returned non-success status"
            );
            return Err(ApiError::ExternalService(
                "Failed to fetch authentication keys".into(),
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            ApiError::ExternalService("Failed to parse authentication keys".into())
        })?;

        tracing::info!(keys_count = %jwks.keys.len(), "JWKS fetched successfully");

        Ok(jwks)
    }
}

/// Convert a JWK to a `DecodingKey`.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    // Only RSA keys are supported
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    DecodingKey::from_rsa_components(n, e).ok()
}

// ============================================================================
// Session Sweeping
// ============================================================================

/// Delete sessions that have already expired. Returns how many were removed.
///
/// Failures are logged and reported as zero; the next sweep retries.
pub fn sweep_expired_sessions<S: Store + ?Sized>(store: &S) -> usize {
    match store.purge_expired_sessions(Utc::now()) {
        Ok(purged) => {
            if purged > 0 {
                tracing::info!(purged, "Expired sessions swept");
            }
            purged
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session sweep failed");
            0
        }
    }
}

/// Sweep expired sessions every `every` for the life of the runtime.
/// The first sweep runs immediately.
pub fn spawn_session_sweeper(store: Arc<RocksStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_expired_sessions(store.as_ref());
        }
    })
}
