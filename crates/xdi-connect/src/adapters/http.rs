//! # HTTP Adapters
//!
//! `reqwest` clients for the discovery registry and the key retrieval
//! endpoint.
//!
//! | Port | Request | Response |
//! |------|---------|----------|
//! | discovery | `GET {registry}discovery?query=<address>` | `{cloud_number, xdi_endpoint_url, signature_public_key}` |
//! | key retrieval | `POST {endpoint}keys/signature` `{cloud_number, secret_token}` | `{private_key}` |
//!
//! A 404 from either endpoint means "nothing found" and is not an error.

use crate::config::{ConfigError, ConnectConfig};
use crate::domain::entities::DiscoveryResult;
use crate::ports::outbound::{
    DiscoveryClient, DiscoveryError, KeyRetrievalClient, KeyRetrievalError,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use xdi_types::{CloudName, CloudNumber};

fn build_client(config: &ConnectConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(config.http_timeout())
        .connect_timeout(config.http_connect_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Join `path` onto `base`, treating `base` as a directory.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut base = base.clone();
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
        base.join(path)
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(default)]
    cloud_number: Option<String>,
    #[serde(default)]
    xdi_endpoint_url: Option<String>,
    #[serde(default)]
    signature_public_key: Option<String>,
}

impl DiscoveryResponse {
    fn into_result(self, query: String) -> Result<DiscoveryResult, DiscoveryError> {
        let cloud_number = self
            .cloud_number
            .map(|n| CloudNumber::parse(&n))
            .transpose()
            .map_err(|e| DiscoveryError::InvalidResponse(e.to_string()))?;
        let xdi_endpoint_url = self
            .xdi_endpoint_url
            .map(|u| Url::parse(&u))
            .transpose()
            .map_err(|e| DiscoveryError::InvalidResponse(format!("xdi_endpoint_url: {e}")))?;

        Ok(DiscoveryResult {
            query,
            cloud_number,
            xdi_endpoint_url,
            signature_public_key: self.signature_public_key,
        })
    }
}

/// Discovery registry client.
pub struct HttpDiscoveryClient {
    client: Client,
    registry: Url,
}

impl HttpDiscoveryClient {
    pub fn new(config: &ConnectConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            registry: config.registry_url()?,
        })
    }

    pub fn registry(&self) -> &Url {
        &self.registry
    }

    async fn query(&self, query: String) -> Result<DiscoveryResult, DiscoveryError> {
        let url = endpoint_url(&self.registry, "discovery")
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(&[("query", query.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    DiscoveryError::Transport(format!("cannot connect to {}", self.registry))
                } else {
                    DiscoveryError::Transport(e.to_string())
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(query = %query, "Registry has no entry");
            return Ok(DiscoveryResult::empty(query));
        }

        let response = response
            .error_for_status()
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;
        let body: DiscoveryResponse = response
            .json()
            .await
            .map_err(|e| DiscoveryError::InvalidResponse(e.to_string()))?;

        body.into_result(query)
    }
}

#[async_trait]
impl DiscoveryClient for HttpDiscoveryClient {
    async fn discover(&self, name: &CloudName) -> Result<DiscoveryResult, DiscoveryError> {
        self.query(name.to_string()).await
    }

    async fn discover_cloud_number(
        &self,
        number: &CloudNumber,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        self.query(number.to_string()).await
    }
}

// =============================================================================
// KEY RETRIEVAL
// =============================================================================

#[derive(Serialize)]
struct KeyRequest<'a> {
    cloud_number: &'a CloudNumber,
    secret_token: &'a str,
}

#[derive(Deserialize)]
struct KeyResponse {
    #[serde(default)]
    private_key: Option<String>,
}

/// Key retrieval endpoint client.
pub struct HttpKeyRetrievalClient {
    client: Client,
}

impl HttpKeyRetrievalClient {
    pub fn new(config: &ConnectConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl KeyRetrievalClient for HttpKeyRetrievalClient {
    async fn retrieve_signature_private_key(
        &self,
        endpoint: &Url,
        cloud_number: &CloudNumber,
        secret_token: &str,
    ) -> Result<Option<String>, KeyRetrievalError> {
        let url = endpoint_url(endpoint, "keys/signature")
            .map_err(|e| KeyRetrievalError::Transport(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&KeyRequest {
                cloud_number,
                secret_token,
            })
            .send()
            .await
            .map_err(|e| KeyRetrievalError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(KeyRetrievalError::Unauthorized)
            }
            _ => {}
        }

        let response = response
            .error_for_status()
            .map_err(|e| KeyRetrievalError::Transport(e.to_string()))?;
        let body: KeyResponse = response
            .json()
            .await
            .map_err(|e| KeyRetrievalError::InvalidResponse(e.to_string()))?;

        debug!(
            cloud_number = %cloud_number,
            found = body.private_key.is_some(),
            "Key retrieval answered"
        );
        Ok(body.private_key)
    }
}
