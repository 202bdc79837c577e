//! Version store over a non-transactional key-value backend.
//!
//! Each operation is an explicit sequence of single-key calls. Steps are
//! ordered so the live document and its blob are persisted before the list
//! bookkeeping; a failure part-way leaves current content retrievable.
//!
//! There is no locking. Two concurrent `write_current` calls may both read
//! the same list and the later list write wins, dropping the other writer's
//! entry. Both documents and blobs are still written.

use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::{SurgeError, SurgeResult};
use crate::traits::KvStore;
use crate::versioning::{sha256_hex, CappedHistory, VersionEntry};

/// Key holding the live document.
pub const KEY_CURRENT: &str = "surge:current";
/// Key holding the JSON-encoded version list.
pub const KEY_VERSIONS: &str = "surge:versions";
/// Prefix for content blobs, followed by the hex hash.
pub const KEY_VERSION_PREFIX: &str = "surge:version:";

/// Backend key of the blob for `hash`.
pub fn version_key(hash: &str) -> String {
    format!("{}{}", KEY_VERSION_PREFIX, hash)
}

/// Live document together with its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    pub content: String,
    pub versions: Vec<VersionEntry>,
    #[serde(rename = "currentSha")]
    pub current_hash: String,
}

/// What a `write_current` call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Hash of the written content.
    pub hash: String,
    /// Whether a new head entry was added to the list.
    pub appended: bool,
    /// Hashes whose blobs were reclaimed by eviction.
    pub reclaimed: Vec<String>,
}

/// Versioned store for the single managed document.
#[derive(Clone)]
pub struct VersionStore {
    backend: Option<Arc<dyn KvStore>>,
    max_versions: usize,
}

impl VersionStore {
    /// Create a store over `backend` keeping the default history length.
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self::with_config(Some(backend), &StoreConfig::default())
    }

    /// Create a store with no backend. Every operation fails with
    /// `BackendUnavailable`.
    pub fn unconfigured() -> Self {
        Self::with_config(None, &StoreConfig::default())
    }

    /// Create a store from an optional backend and explicit settings.
    pub fn with_config(backend: Option<Arc<dyn KvStore>>, config: &StoreConfig) -> Self {
        Self {
            backend,
            max_versions: config.max_versions,
        }
    }

    /// Whether a backend is attached.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Maximum number of entries retained in the version list.
    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    fn backend(&self) -> SurgeResult<&dyn KvStore> {
        self.backend
            .as_deref()
            .ok_or_else(SurgeError::backend_not_configured)
    }

    /// Current document content, or an empty string if never written.
    pub async fn read_current(&self) -> SurgeResult<String> {
        let kv = self.backend()?;
        Ok(kv.get(KEY_CURRENT).await?.unwrap_or_default())
    }

    /// Version list, newest first. Empty if nothing was written yet.
    pub async fn read_versions(&self) -> SurgeResult<Vec<VersionEntry>> {
        let kv = self.backend()?;
        match kv.get(KEY_VERSIONS).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Content stored for `hash`, or `None` if no blob exists.
    pub async fn read_version_content(&self, hash: &str) -> SurgeResult<Option<String>> {
        let kv = self.backend()?;
        kv.get(&version_key(hash)).await
    }

    /// Current content, version list and the hash of the current content.
    pub async fn snapshot(&self) -> SurgeResult<DocumentSnapshot> {
        let content = self.read_current().await?;
        let versions = self.read_versions().await?;
        let current_hash = sha256_hex(&content);
        Ok(DocumentSnapshot {
            content,
            versions,
            current_hash,
        })
    }

    /// Replace the document with `content` and record it in the history.
    ///
    /// If the newest entry already has the same hash the list is left alone,
    /// but the document and its blob are still rewritten.
    pub async fn write_current(&self, content: &str) -> SurgeResult<WriteOutcome> {
        let kv = self.backend()?;
        let entry = VersionEntry::for_content(content);
        let hash = entry.content_hash.clone();

        let prev = self.read_versions().await?;
        let latest_same = prev.first().is_some_and(|v| v.content_hash == hash);

        kv.set(KEY_CURRENT, content).await?;
        kv.set(&version_key(&hash), content).await?;

        if latest_same {
            return Ok(WriteOutcome {
                hash,
                appended: false,
                reclaimed: Vec::new(),
            });
        }

        let mut history = CappedHistory::from_vec(prev, self.max_versions);
        let mut evicted = Vec::new();
        history.push_front_with(entry, |old| evicted.push(old));

        let list = serde_json::to_string(&history.iter().collect::<Vec<_>>())?;
        kv.set(KEY_VERSIONS, &list).await?;

        // Every evicted blob goes, except the one just written
        let mut seen = HashSet::new();
        let reclaimed: Vec<String> = evicted
            .into_iter()
            .map(|old| old.content_hash)
            .filter(|h| *h != hash && seen.insert(h.clone()))
            .collect();
        try_join_all(reclaimed.iter().map(|h| {
            let key = version_key(h);
            async move { kv.delete(&key).await }
        }))
        .await?;

        Ok(WriteOutcome {
            hash,
            appended: true,
            reclaimed,
        })
    }

    /// Make the content stored under `hash` current again.
    ///
    /// This goes through `write_current`, so it normally adds a fresh head
    /// entry; it adds none when `hash` is already the head.
    pub async fn rollback_to(&self, hash: &str) -> SurgeResult<WriteOutcome> {
        let content = self
            .read_version_content(hash)
            .await?
            .ok_or_else(|| SurgeError::version_not_found(hash))?;
        self.write_current(&content).await
    }

    /// Remove `hash` from the history and reclaim its blob.
    ///
    /// Refuses to remove the version backing the live document. Removing a
    /// hash that is not in the list is a no-op. Returns whether anything was
    /// removed.
    pub async fn delete_version(&self, hash: &str) -> SurgeResult<bool> {
        let kv = self.backend()?;
        let current = self.read_current().await?;
        if sha256_hex(&current) == hash {
            return Err(SurgeError::cannot_delete_current(hash));
        }

        let list = self.read_versions().await?;
        let mut history = CappedHistory::from_vec(list, self.max_versions);
        if history.retain(|v| v.content_hash != hash) == 0 {
            return Ok(false);
        }

        let next = serde_json::to_string(&history.into_vec())?;
        kv.set(KEY_VERSIONS, &next).await?;
        kv.delete(&version_key(hash)).await?;
        Ok(true)
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("max_versions", &self.max_versions)
            .finish()
    }
}
