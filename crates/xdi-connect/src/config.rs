//! Connect configuration with validation.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `XDI_DISCOVERY_REGISTRY` | `https://registry.xdi2.org/` |
//! | `XDI_HTTP_TIMEOUT_SECS` | `10` |
//! | `XDI_HTTP_CONNECT_TIMEOUT_SECS` | `5` |
//! | `XDI_USER_AGENT` | `xdi-connect/<version>` |

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default discovery registry.
pub const DEFAULT_DISCOVERY_REGISTRY: &str = "https://registry.xdi2.org/";

/// Configuration of the HTTP collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Base URL of the discovery registry
    pub discovery_registry: String,
    /// Whole-request timeout for discovery and key retrieval
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            discovery_registry: DEFAULT_DISCOVERY_REGISTRY.to_string(),
            http_timeout_secs: 10,
            http_connect_timeout_secs: 5,
            user_agent: format!("xdi-connect/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConnectConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(registry) = lookup("XDI_DISCOVERY_REGISTRY") {
            config.discovery_registry = registry;
        }
        if let Some(secs) = lookup("XDI_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_secs("XDI_HTTP_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("XDI_HTTP_CONNECT_TIMEOUT_SECS") {
            config.http_connect_timeout_secs = parse_secs("XDI_HTTP_CONNECT_TIMEOUT_SECS", &secs)?;
        }
        if let Some(agent) = lookup("XDI_USER_AGENT") {
            config.user_agent = agent;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry_url()?;

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "http_timeout_secs cannot be 0".into(),
            ));
        }
        if self.http_connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "http_connect_timeout_secs cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Parsed registry URL, always ending in `/`.
    pub fn registry_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.discovery_registry)
            .map_err(|e| ConfigError::InvalidRegistry(format!("{}: {e}", self.discovery_registry)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidRegistry(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(format!("{key}='{value}' is not a number")))
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Registry URL does not parse or is not http(s)
    #[error("invalid discovery registry: {0}")]
    InvalidRegistry(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// The HTTP client could not be built
    #[error("HTTP client: {0}")]
    HttpClient(String),
}
