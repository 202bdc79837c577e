//! Versioned storage for the single managed document.
//!
//! The live document, a capped newest-first list of version metadata, and
//! one content blob per distinct hash are kept as three independent key
//! spaces in the backend.

mod history;
mod store;
mod version;

pub use history::CappedHistory;
pub use store::{
    version_key, DocumentSnapshot, VersionStore, WriteOutcome, KEY_CURRENT, KEY_VERSIONS,
    KEY_VERSION_PREFIX,
};
pub use version::{sha256_hex, VersionEntry};
