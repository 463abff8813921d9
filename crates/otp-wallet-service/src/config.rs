//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use otp_wallet_core::DEFAULT_SESSION_TTL_HOURS;

/// Longest accepted session lifetime in hours (one year).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Default interval between expired-session sweeps.
const DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS: u64 = 3600;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/otp-wallet").
    pub data_dir: String,

    /// Session lifetime in hours (default: 24, at most [`MAX_SESSION_TTL_HOURS`]).
    pub session_ttl_hours: i64,

    /// Seconds between sweeps that delete expired sessions (default: 3600).
    pub session_sweep_interval_seconds: u64,

    /// Usernames promoted to admin when they register or log in.
    pub admin_usernames: Vec<String>,

    /// External identity provider (optional).
    pub identity: Option<IdentityConfig>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Identity provider settings for federated login.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Token issuer, matched exactly against the `iss` claim.
    pub issuer: String,
    /// Expected `aud` claim.
    pub audience: String,
}

impl IdentityConfig {
    /// URL of the provider's key set, `{issuer}/.well-known/jwks.json`.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!(
            "{}/.well-known/jwks.json",
            self.issuer.trim_end_matches('/')
        )
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/otp-wallet".into()),
            session_ttl_hours: parse_session_ttl_hours(
                std::env::var("SESSION_TTL_HOURS").ok().as_deref(),
            ),
            session_sweep_interval_seconds: std::env::var("SESSION_SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|seconds| *seconds > 0)
                .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS),
            admin_usernames: std::env::var("ADMIN_USERNAMES")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            identity: load_identity_config(),
            cors_origins: split_list(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()),
            ),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Whether a username is listed as an admin.
    #[must_use]
    pub fn is_admin_username(&self, username: &str) -> bool {
        self.admin_usernames.iter().any(|name| name == username)
    }
}

/// Parse `SESSION_TTL_HOURS`, falling back to the default when unset or not
/// positive and capping it at [`MAX_SESSION_TTL_HOURS`].
fn parse_session_ttl_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|hours| *hours > 0)
        .map_or(DEFAULT_SESSION_TTL_HOURS, |hours| {
            hours.min(MAX_SESSION_TTL_HOURS)
        })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load identity provider settings from file or environment.
fn load_identity_config() -> Option<IdentityConfig> {
    // Try multiple paths for the secrets file
    let secret_paths = [
        ".secrets/identity.json",
        "otp-wallet/.secrets/identity.json",
        "../.secrets/identity.json",
    ];

    for path in &secret_paths {
        if let Ok(identity) = load_secrets_file::<IdentityConfig>(Path::new(path)) {
            tracing::info!(path = %path, "Loaded identity provider settings from file");
            return Some(identity);
        }
    }

    // Fall back to environment variables
    tracing::debug!("Identity secrets file not found, using environment variables");
    let issuer = std::env::var("IDENTITY_ISSUER").ok()?;
    let audience = std::env::var("IDENTITY_AUDIENCE").ok()?;
    Some(IdentityConfig { issuer, audience })
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/otp-wallet".into(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            session_sweep_interval_seconds: DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS,
            admin_usernames: Vec::new(),
            identity: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
