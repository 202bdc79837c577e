//! Key-value backend trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SurgeResult;

/// Core KvStore trait - all key-value backends implement this.
///
/// Only single-key primitives are offered. Callers must not assume that two
/// calls are applied atomically with respect to each other.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a string value. `None` when the key is absent.
    async fn get(&self, key: &str) -> SurgeResult<Option<String>>;

    /// Set a string value, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> SurgeResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> SurgeResult<()>;

    /// Atomically increment a counter, starting its expiry window on the
    /// first increment. Returns the counter value after incrementing.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> SurgeResult<i64>;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Key-value backend provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendProvider {
    /// Upstash Redis over its REST API.
    #[default]
    Upstash,
    /// Process-local map. Data is lost on restart.
    Memory,
}

/// Key-value backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: BackendProvider,
    /// REST endpoint URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// REST bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::Upstash,
            url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Whether enough settings are present to construct a client.
    pub fn is_configured(&self) -> bool {
        match self.provider {
            BackendProvider::Memory => true,
            BackendProvider::Upstash => {
                self.url.as_deref().is_some_and(|u| !u.is_empty())
                    && self.token.as_deref().is_some_and(|t| !t.is_empty())
            }
        }
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
