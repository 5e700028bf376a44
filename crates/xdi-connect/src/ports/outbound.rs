//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the Connect service calls out to: the discovery registry
//! and the key retrieval endpoint of a cloud.

use crate::domain::entities::DiscoveryResult;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;
use xdi_types::{CloudName, CloudNumber};

/// Error from a discovery lookup.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The registry could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The registry answered with something unusable
    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
}

/// Error from a key retrieval call.
#[derive(Debug, Error)]
pub enum KeyRetrievalError {
    /// The secret token was rejected
    #[error("Secret token rejected")]
    Unauthorized,

    /// The endpoint could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with something unusable
    #[error("Invalid endpoint response: {0}")]
    InvalidResponse(String),
}

/// Resolves identities through a discovery registry.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Resolve a cloud name to its cloud number and XDI endpoint.
    ///
    /// An unknown name yields an empty [`DiscoveryResult`], not an error.
    async fn discover(&self, name: &CloudName) -> Result<DiscoveryResult, DiscoveryError>;

    /// Resolve a cloud number to its endpoint and published public key.
    async fn discover_cloud_number(
        &self,
        number: &CloudNumber,
    ) -> Result<DiscoveryResult, DiscoveryError>;
}

/// Fetches private signing keys from a cloud's endpoint.
#[async_trait]
pub trait KeyRetrievalClient: Send + Sync {
    /// Retrieve the signature private key of `cloud_number`.
    ///
    /// # Returns
    /// Key material as PEM or base64 DER, or `None` if the endpoint has none.
    ///
    /// # Errors
    /// * `KeyRetrievalError::Unauthorized` - `secret_token` was rejected
    async fn retrieve_signature_private_key(
        &self,
        endpoint: &Url,
        cloud_number: &CloudNumber,
        secret_token: &str,
    ) -> Result<Option<String>, KeyRetrievalError>;
}

#[async_trait]
impl<T: DiscoveryClient + ?Sized> DiscoveryClient for Arc<T> {
    async fn discover(&self, name: &CloudName) -> Result<DiscoveryResult, DiscoveryError> {
        (**self).discover(name).await
    }

    async fn discover_cloud_number(
        &self,
        number: &CloudNumber,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        (**self).discover_cloud_number(number).await
    }
}

#[async_trait]
impl<T: KeyRetrievalClient + ?Sized> KeyRetrievalClient for Arc<T> {
    async fn retrieve_signature_private_key(
        &self,
        endpoint: &Url,
        cloud_number: &CloudNumber,
        secret_token: &str,
    ) -> Result<Option<String>, KeyRetrievalError> {
        (**self)
            .retrieve_signature_private_key(endpoint, cloud_number, secret_token)
            .await
    }
}
