//! Version metadata and content hashing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `content`, lowercase hex.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Metadata for one point-in-time snapshot of the document.
///
/// Serialized as `{"ts", "sha256", "size"}`, which is the layout already
/// present in deployed backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// ISO-8601 UTC timestamp with millisecond precision.
    #[serde(rename = "ts")]
    pub timestamp: String,
    /// Hex SHA-256 of the content.
    #[serde(rename = "sha256")]
    pub content_hash: String,
    /// Content length in UTF-8 bytes.
    pub size: u64,
}

impl VersionEntry {
    /// Build the entry for `content` stamped with the current time.
    pub fn for_content(content: &str) -> Self {
        Self::for_content_at(content, Utc::now())
    }

    /// Build the entry for `content` stamped with `at`.
    pub fn for_content_at(content: &str, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            content_hash: sha256_hex(content),
            size: content.len() as u64,
        }
    }

    /// Parsed timestamp, if it is valid RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}
