//! Server settings loaded from the environment.

use surgebox_core::config::SurgeConfig;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Session lifetime.
pub const SESSION_TTL_SECS: u64 = 2 * 60 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Shared login secret. Empty means nobody can log in.
    pub app_password: String,
    /// Path token every API route must carry. Empty disables the check.
    pub url_token: String,
    /// Key used to sign session cookies.
    pub session_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Upload size limit in bytes.
    pub max_upload_bytes: usize,
    /// Whether to mark cookies `Secure`.
    pub secure_cookies: bool,
    /// Backend and store settings.
    pub surge: SurgeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            app_password: String::new(),
            url_token: String::new(),
            session_secret: String::new(),
            session_ttl_secs: SESSION_TTL_SECS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            secure_cookies: true,
            surge: SurgeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self {
            surge: SurgeConfig::from_env(),
            ..Self::default()
        };

        if let Ok(host) = std::env::var("SURGEBOX_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("SURGEBOX_PORT") {
            config.port = port
                .parse()
                .map_err(|_| format!("SURGEBOX_PORT must be a valid port number, got {}", port))?;
        }

        config.app_password = std::env::var("APP_PASSWORD").unwrap_or_default();
        config.url_token = std::env::var("URL_TOKEN").unwrap_or_default();
        config.session_secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| config.app_password.clone());

        if let Ok(secure) = std::env::var("SURGEBOX_SECURE_COOKIES") {
            config.secure_cookies = !matches!(secure.to_lowercase().as_str(), "0" | "false" | "no");
        }

        Ok(config)
    }

    /// Builder: set the login password and, unless already set, the
    /// session key.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.app_password = password.into();
        if self.session_secret.is_empty() {
            self.session_secret = self.app_password.clone();
        }
        self
    }

    /// Builder: set the path token.
    pub fn with_url_token(mut self, token: impl Into<String>) -> Self {
        self.url_token = token.into();
        self
    }
}
