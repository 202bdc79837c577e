//! Configuration system for surgebox.

use serde::{Deserialize, Serialize};

use crate::error::{SurgeError, SurgeResult};
use crate::traits::{BackendConfig, BackendProvider};

/// Default number of versions kept in history.
pub const MAX_VERSIONS: usize = 5;

/// Version store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum entries in the version list.
    pub max_versions: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_versions: MAX_VERSIONS,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgeConfig {
    /// Key-value backend configuration.
    pub backend: BackendConfig,
    /// Version store configuration.
    pub store: StoreConfig,
}

impl SurgeConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SurgeResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| SurgeError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SurgeError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| SurgeError::Configuration(e.to_string())),
            _ => Err(SurgeError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Both the `UPSTASH_REDIS_REST_*` and the `KV_REST_API_*` names are
    /// accepted; the former wins when both are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(provider) = non_empty("SURGEBOX_BACKEND") {
            config.backend.provider = match provider.to_lowercase().as_str() {
                "memory" => BackendProvider::Memory,
                _ => BackendProvider::Upstash,
            };
        }

        config.backend.url =
            non_empty("UPSTASH_REDIS_REST_URL").or_else(|| non_empty("KV_REST_API_URL"));
        config.backend.token =
            non_empty("UPSTASH_REDIS_REST_TOKEN").or_else(|| non_empty("KV_REST_API_TOKEN"));

        if let Some(secs) = non_empty("SURGEBOX_BACKEND_TIMEOUT_SECS").and_then(|s| s.parse().ok())
        {
            config.backend.timeout_secs = secs;
        }
        if let Some(max) = non_empty("SURGEBOX_MAX_VERSIONS").and_then(|s| s.parse().ok()) {
            config.store.max_versions = max;
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> SurgeConfigBuilder {
        SurgeConfigBuilder::default()
    }
}

/// Builder for SurgeConfig.
#[derive(Default)]
pub struct SurgeConfigBuilder {
    config: SurgeConfig,
}

impl SurgeConfigBuilder {
    /// Set backend configuration.
    pub fn backend(mut self, config: BackendConfig) -> Self {
        self.config.backend = config;
        self
    }

    /// Use the Upstash REST backend.
    pub fn upstash(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.config.backend.provider = BackendProvider::Upstash;
        self.config.backend.url = Some(url.into());
        self.config.backend.token = Some(token.into());
        self
    }

    /// Use the in-process backend.
    pub fn in_memory(mut self) -> Self {
        self.config.backend.provider = BackendProvider::Memory;
        self
    }

    /// Set history length.
    pub fn max_versions(mut self, max: usize) -> Self {
        self.config.store.max_versions = max;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SurgeConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SurgeConfig::default();
        assert_eq!(config.store.max_versions, 5);
        assert_eq!(config.backend.provider, BackendProvider::Upstash);
        assert!(!config.backend.is_configured());
    }

    #[test]
    fn test_env_prefers_upstash_names() {
        let config = SurgeConfig::from_lookup(lookup(&[
            ("UPSTASH_REDIS_REST_URL", "https://a.upstash.io"),
            ("KV_REST_API_URL", "https://b.upstash.io"),
            ("KV_REST_API_TOKEN", "kv-token"),
        ]));
        assert_eq!(config.backend.url.as_deref(), Some("https://a.upstash.io"));
        assert_eq!(config.backend.token.as_deref(), Some("kv-token"));
        assert!(config.backend.is_configured());
    }

    #[test]
    fn test_env_ignores_empty_values() {
        let config = SurgeConfig::from_lookup(lookup(&[
            ("UPSTASH_REDIS_REST_URL", ""),
            ("KV_REST_API_URL", "https://b.upstash.io"),
            ("SURGEBOX_MAX_VERSIONS", "not-a-number"),
        ]));
        assert_eq!(config.backend.url.as_deref(), Some("https://b.upstash.io"));
        assert_eq!(config.store.max_versions, MAX_VERSIONS);
    }

    #[test]
    fn test_env_memory_backend() {
        let config = SurgeConfig::from_lookup(lookup(&[
            ("SURGEBOX_BACKEND", "Memory"),
            ("SURGEBOX_BACKEND_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.backend.provider, BackendProvider::Memory);
        assert_eq!(config.backend.timeout_secs, 3);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[backend]
provider = "upstash"
url = "https://x.upstash.io"
token = "t"

[store]
max_versions = 8
"#
        )
        .unwrap();

        let config = SurgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store.max_versions, 8);
        assert_eq!(config.backend.timeout_secs, 10);
        assert!(config.backend.is_configured());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = SurgeConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SurgeError::Configuration(_)));
    }

    #[test]
    fn test_builder() {
        let config = SurgeConfig::builder()
            .upstash("https://x", "t")
            .max_versions(3)
            .build();
        assert!(config.backend.is_configured());
        assert_eq!(config.store.max_versions, 3);

        let config = SurgeConfig::builder().in_memory().build();
        assert_eq!(config.backend.provider, BackendProvider::Memory);
    }
}
