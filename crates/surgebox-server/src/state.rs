//! Server state management.

use std::sync::Arc;

use surgebox_core::error::SurgeResult;
use surgebox_core::{LoginRateLimiter, VersionStore};
use surgebox_kv::KvStoreFactory;

use crate::auth::SessionSigner;
use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: VersionStore,
    pub limiter: LoginRateLimiter,
    pub sessions: SessionSigner,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build state from explicit parts.
    pub fn new(store: VersionStore, limiter: LoginRateLimiter, config: ServerConfig) -> Self {
        let sessions = SessionSigner::new(&config.session_secret, config.session_ttl_secs);
        Self {
            store,
            limiter,
            sessions,
            config: Arc::new(config),
        }
    }

    /// Build state from configuration, connecting the backend if one is set.
    ///
    /// A missing backend is not an error: the server starts and reports
    /// 503 on every document request.
    pub fn from_config(config: ServerConfig) -> SurgeResult<Self> {
        let backend = KvStoreFactory::create(&config.surge.backend)?;
        let store = VersionStore::with_config(backend.clone(), &config.surge.store);
        let limiter = LoginRateLimiter::new(backend);
        Ok(Self::new(store, limiter, config))
    }

    /// Check if the backend is configured.
    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }
}
