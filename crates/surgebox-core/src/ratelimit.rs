//! Fixed-window login attempt limiter backed by the key-value store.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SurgeResult;
use crate::traits::KvStore;

/// Attempts allowed per window.
pub const LOGIN_LIMIT: i64 = 10;
/// Window length.
pub const LOGIN_WINDOW: Duration = Duration::from_secs(10 * 60);

const KEY_PREFIX: &str = "rl:login:";

/// Outcome of one attempt check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Attempt may proceed. Carries the count so far, if one was recorded.
    Allowed { attempts: Option<i64> },
    /// Too many attempts in the current window.
    Limited { attempts: i64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-address login limiter.
///
/// Without a backend every attempt is allowed.
#[derive(Clone)]
pub struct LoginRateLimiter {
    backend: Option<Arc<dyn KvStore>>,
    limit: i64,
    window: Duration,
}

impl LoginRateLimiter {
    /// Limiter with the default limit and window.
    pub fn new(backend: Option<Arc<dyn KvStore>>) -> Self {
        Self {
            backend,
            limit: LOGIN_LIMIT,
            window: LOGIN_WINDOW,
        }
    }

    /// Override the limit and window.
    pub fn with_limit(mut self, limit: i64, window: Duration) -> Self {
        self.limit = limit;
        self.window = window;
        self
    }

    /// Length of the counting window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counter key for `addr`.
    pub fn key_for(addr: &str) -> String {
        format!("{}{}", KEY_PREFIX, addr)
    }

    /// Record an attempt from `addr` and decide whether it may proceed.
    pub async fn check(&self, addr: &str) -> SurgeResult<RateDecision> {
        let Some(kv) = self.backend.as_deref() else {
            return Ok(RateDecision::Allowed { attempts: None });
        };

        let attempts = kv.incr_with_expiry(&Self::key_for(addr), self.window).await?;
        if attempts > self.limit {
            tracing::debug!(addr, attempts, "login attempt rate limited");
            return Ok(RateDecision::Limited { attempts });
        }
        Ok(RateDecision::Allowed {
            attempts: Some(attempts),
        })
    }
}
