//! Upstash Redis REST backend.
//!
//! Every command is sent as a JSON array (`["SET", key, value]`) POSTed to
//! the database URL with a bearer token. Replies are `{"result": ...}` on
//! success and `{"error": "..."}` on failure.

use async_trait::async_trait;
use std::time::Duration;

use surgebox_core::error::{ErrorCode, SurgeError, SurgeResult};
use surgebox_core::traits::{BackendConfig, KvStore};

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Upstash Redis REST client.
pub struct UpstashKvStore {
    client: Client,
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl UpstashKvStore {
    /// Create a new Upstash client.
    pub fn new(config: &BackendConfig) -> SurgeResult<Self> {
        let url = config
            .url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                SurgeError::Configuration(
                    "Upstash URL required. Set UPSTASH_REDIS_REST_URL or KV_REST_API_URL."
                        .to_string(),
                )
            })?;

        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SurgeError::Configuration(
                    "Upstash token required. Set UPSTASH_REDIS_REST_TOKEN or KV_REST_API_TOKEN."
                        .to_string(),
                )
            })?;

        let parsed = url::Url::parse(&url)
            .map_err(|e| SurgeError::Configuration(format!("Invalid Upstash URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SurgeError::Configuration(format!(
                "Upstash URL must be http(s), got {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SurgeError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Run one command and return its `result` value.
    async fn command(&self, args: Value) -> SurgeResult<Value> {
        let name = args[0].as_str().unwrap_or_default().to_string();
        let key = args[1].as_str().unwrap_or_default().to_string();
        debug!(command = %name, key = %key, "upstash command");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| {
                let code = if e.is_timeout() || e.is_connect() {
                    ErrorCode::KvConnectionFailed
                } else {
                    ErrorCode::KvOperationFailed
                };
                SurgeError::backend_with_source(format!("{} {} failed", name, key), code, e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SurgeError::backend_with_source(
                format!("{} {}: failed to read response", name, key),
                ErrorCode::KvConnectionFailed,
                e,
            )
        })?;

        let parsed: CommandResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(SurgeError::backend(format!(
                    "{} {}: HTTP {}: {}",
                    name, key, status, body
                )));
            }
            Err(e) => {
                return Err(SurgeError::backend_with_source(
                    format!("{} {}: failed to parse response", name, key),
                    ErrorCode::KvInvalidResponse,
                    e,
                ));
            }
        };

        if let Some(error) = parsed.error {
            return Err(SurgeError::backend(format!("{} {}: {}", name, key, error)));
        }
        if !status.is_success() {
            return Err(SurgeError::backend(format!(
                "{} {}: HTTP {}",
                name, key, status
            )));
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }

    fn expect_integer(name: &str, key: &str, value: Value) -> SurgeResult<i64> {
        match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            SurgeError::backend(format!("{} {}: expected integer, got {}", name, key, value))
        })
    }
}

#[async_trait]
impl KvStore for UpstashKvStore {
    async fn get(&self, key: &str) -> SurgeResult<Option<String>> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // Stored scalars written by other clients come back as JSON
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> SurgeResult<()> {
        self.command(json!(["SET", key, value])).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> SurgeResult<()> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, window: Duration) -> SurgeResult<i64> {
        let count = Self::expect_integer("INCR", key, self.command(json!(["INCR", key])).await?)?;
        if count == 1 {
            self.command(json!(["EXPIRE", key, window.as_secs().max(1)]))
                .await?;
        }
        Ok(count)
    }

    fn name(&self) -> &str {
        "upstash"
    }
}
