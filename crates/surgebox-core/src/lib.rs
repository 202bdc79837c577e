//! surgebox-core - Core library for surgebox.
//!
//! This crate provides the version store for the single managed Surge
//! profile, the key-value backend trait it runs on, and the login rate
//! limiter.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use surgebox_core::{InMemoryKvStore, VersionStore};
//!
//! let store = VersionStore::new(Arc::new(InMemoryKvStore::new()));
//!
//! store.write_current("[General]\nloglevel = notify\n").await?;
//! let versions = store.read_versions().await?;
//! store.rollback_to(&versions[0].content_hash).await?;
//! ```

pub mod config;
pub mod error;
pub mod kv;
pub mod ratelimit;
pub mod traits;
pub mod versioning;

// Re-export commonly used types
pub use config::{StoreConfig, SurgeConfig, MAX_VERSIONS};
pub use error::{ErrorCode, SurgeError, SurgeResult};
pub use kv::InMemoryKvStore;
pub use ratelimit::{LoginRateLimiter, RateDecision};
pub use traits::{BackendConfig, BackendProvider, KvStore};
pub use versioning::{
    sha256_hex, CappedHistory, DocumentSnapshot, VersionEntry, VersionStore, WriteOutcome,
};
