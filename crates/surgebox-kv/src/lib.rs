//! surgebox-kv - Key-value backend implementations for surgebox.
//!
//! # Supported Backends
//!
//! - **Upstash** (feature: `upstash`) - Upstash Redis over its REST API
//! - **Memory** - process-local map from `surgebox-core`, for local runs

mod factory;

#[cfg(feature = "upstash")]
mod upstash;

// Public exports
pub use factory::KvStoreFactory;

#[cfg(feature = "upstash")]
pub use upstash::UpstashKvStore;

// Re-export core types for convenience
pub use surgebox_core::kv::InMemoryKvStore;
pub use surgebox_core::traits::{BackendConfig, BackendProvider, KvStore};
