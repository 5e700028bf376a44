//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the Connect service.

use crate::domain::entities::{SigningReport, VerificationReport};
use crate::domain::errors::ConnectError;
use crate::domain::request::ConnectionRequest;
use async_trait::async_trait;
use xdi_types::{CloudName, MessageEnvelope};

/// Primary Connect API.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Sign every message of `request` with the signature key of `cloud_name`.
    ///
    /// Steps, each mapped to its own error:
    /// 1. discover `cloud_name` (`DiscoveryFailed`)
    /// 2. retrieve the private key with `secret_token` (`KeyRetrievalFailed`)
    /// 3. decode the key (`KeyDecodingError`)
    /// 4. sign each message (`SignatureCreationError`)
    async fn sign(
        &self,
        request: &mut ConnectionRequest<'_>,
        cloud_name: &CloudName,
        secret_token: &str,
    ) -> Result<SigningReport, ConnectError>;

    /// Check every message signature against the sender's published key.
    async fn verify(&self, envelope: &MessageEnvelope) -> VerificationReport;

    /// Logo of the provider hosting `endpoint`.
    fn csp_logo(&self, endpoint: &str) -> &'static str;
}
