//! In-process key-value backend.
//!
//! Holds everything in a map guarded by an async mutex. Used by tests and by
//! the server's `memory` provider for local runs without Upstash.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{SurgeError, SurgeResult};
use crate::traits::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Map-backed `KvStore` with counter expiry and failure injection.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    offline: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
}

impl InMemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make writes and deletes of `key` fail while other keys keep working.
    pub async fn fail_writes_to(&self, key: impl Into<String>) {
        self.failing_keys.lock().await.insert(key.into());
    }

    /// Clear all injected write failures.
    pub async fn clear_failures(&self) {
        self.failing_keys.lock().await.clear();
    }

    /// Whether a live value exists for `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .get(key)
            .is_some_and(|e| e.is_live(now))
    }

    fn check_online(&self, op: &str, key: &str) -> SurgeResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SurgeError::backend(format!(
                "{} {}: backend offline",
                op, key
            )));
        }
        Ok(())
    }

    async fn check_writable(&self, op: &str, key: &str) -> SurgeResult<()> {
        if self.failing_keys.lock().await.contains(key) {
            return Err(SurgeError::backend(format!(
                "{} {}: injected write failure",
                op, key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> SurgeResult<Option<String>> {
        self.check_online("GET", key)?;
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> SurgeResult<()> {
        self.check_online("SET", key)?;
        self.check_writable("SET", key).await?;
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> SurgeResult<()> {
        self.check_online("DEL", key)?;
        self.check_writable("DEL", key).await?;
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> SurgeResult<i64> {
        self.check_online("INCR", key)?;
        self.check_writable("INCR", key).await?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let current = match entries.get(key) {
            Some(e) if e.is_live(now) => Some(e.clone()),
            _ => None,
        };

        let (count, expires_at) = match current {
            Some(entry) => {
                let count = entry.value.parse::<i64>().map_err(|_| {
                    SurgeError::backend(format!("INCR {}: value is not an integer", key))
                })?;
                (count + 1, entry.expires_at)
            }
            None => (1, Some(now + window)),
        };

        entries.insert(
            key.to_string(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
