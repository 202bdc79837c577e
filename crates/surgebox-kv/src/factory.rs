//! Factory for creating key-value backends.

use std::sync::Arc;

use surgebox_core::error::{SurgeError, SurgeResult};
use surgebox_core::kv::InMemoryKvStore;
use surgebox_core::traits::{BackendConfig, BackendProvider, KvStore};
use tracing::warn;

/// Factory for creating key-value backends.
pub struct KvStoreFactory;

impl KvStoreFactory {
    /// Create a backend from the given configuration.
    ///
    /// Returns `Ok(None)` when the configuration is incomplete; callers then
    /// run with an unconfigured store whose operations fail with
    /// `BackendUnavailable`.
    pub fn create(config: &BackendConfig) -> SurgeResult<Option<Arc<dyn KvStore>>> {
        if !config.is_configured() {
            warn!(
                "Missing Upstash REST settings: (UPSTASH_REDIS_REST_URL|KV_REST_API_URL) / \
                 (UPSTASH_REDIS_REST_TOKEN|KV_REST_API_TOKEN)"
            );
            return Ok(None);
        }

        match config.provider {
            BackendProvider::Memory => Ok(Some(Arc::new(InMemoryKvStore::new()))),

            #[cfg(feature = "upstash")]
            BackendProvider::Upstash => {
                let store = crate::upstash::UpstashKvStore::new(config)?;
                Ok(Some(Arc::new(store)))
            }

            #[allow(unreachable_patterns)]
            provider => Err(SurgeError::Configuration(format!(
                "Backend provider {:?} is not enabled. Enable the corresponding feature.",
                provider
            ))),
        }
    }
}
