//! Application state.

use std::sync::Arc;

use otp_wallet_store::RocksStore;

use crate::auth::IdentityVerifier;
use crate::config::{ServiceConfig, MAX_SESSION_TTL_HOURS};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// ID token verifier for federated login (optional).
    pub identity: Option<Arc<IdentityVerifier>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let identity = config.identity.clone().map(|identity| {
            tracing::info!(issuer = %identity.issuer, "Federated login enabled");
            Arc::new(IdentityVerifier::new(identity))
        });

        if identity.is_none() {
            tracing::warn!("Identity provider not configured - federated login disabled");
        }

        Self {
            store,
            config,
            identity,
        }
    }

    /// Session lifetime as a chrono duration.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}
