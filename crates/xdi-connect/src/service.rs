//! # Connect Service
//!
//! Application service layer that implements the `ConnectApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`ConnectApi`)
//! - Uses the outbound ports (`DiscoveryClient`, `KeyRetrievalClient`)
//! - Delegates signing and verification to `xdi-crypto`
//!
//! ## Sign Flow
//!
//! ```text
//! cloud name ──discover──→ (cloud number, endpoint)
//!                               │
//!                               ↓
//!            retrieve_signature_private_key(endpoint, cloud number, token)
//!                               │
//!                               ↓
//!                    decode ──→ sign each message
//! ```
//!
//! Nothing is cached between calls and nothing is retried.

use crate::domain::csp::csp_logo_for_endpoint;
use crate::domain::entities::{
    MessageVerification, SigningReport, VerificationOutcome, VerificationReport,
};
use crate::domain::errors::ConnectError;
use crate::domain::request::ConnectionRequest;
use crate::ports::inbound::ConnectApi;
use crate::ports::outbound::{DiscoveryClient, KeyRetrievalClient};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use xdi_crypto::{verify_message, RsaSigningKey, RsaVerifyingKey};
use xdi_types::{CloudName, CloudNumber, Message, MessageEnvelope};
use zeroize::Zeroizing;

/// Connect Service.
///
/// Signs connection requests with keys fetched on demand and verifies
/// signed envelopes against published keys.
pub struct ConnectService<D: DiscoveryClient, K: KeyRetrievalClient> {
    discovery: D,
    keys: K,
}

impl<D: DiscoveryClient, K: KeyRetrievalClient> ConnectService<D, K> {
    /// Create a new Connect service.
    ///
    /// # Arguments
    /// * `discovery` - Registry client for name and number lookups
    /// * `keys` - Client for the key retrieval endpoint
    pub fn new(discovery: D, keys: K) -> Self {
        Self { discovery, keys }
    }

    /// Check one message against its sender's published key.
    async fn verify_one(&self, message: &Message) -> VerificationOutcome {
        if message.signature().is_none() {
            return VerificationOutcome::Unsigned;
        }

        let Some(cloud_number) = CloudNumber::from_address(&message.sender) else {
            return VerificationOutcome::SenderUnknown(format!(
                "sender {} is not a cloud number",
                message.sender
            ));
        };

        let discovery = match self.discovery.discover_cloud_number(&cloud_number).await {
            Ok(discovery) => discovery,
            Err(e) => return VerificationOutcome::SenderUnknown(e.to_string()),
        };

        let Some(material) = discovery.signature_public_key else {
            return VerificationOutcome::SenderUnknown(format!(
                "no signature public key published for {cloud_number}"
            ));
        };

        let key = match RsaVerifyingKey::decode(&material) {
            Ok(key) => key,
            Err(e) => return VerificationOutcome::SenderUnknown(e.to_string()),
        };

        match verify_message(message, &key) {
            Ok(()) => VerificationOutcome::Valid,
            Err(e) => VerificationOutcome::Invalid(e.to_string()),
        }
    }
}

#[async_trait]
impl<D: DiscoveryClient, K: KeyRetrievalClient> ConnectApi for ConnectService<D, K> {
    async fn sign(
        &self,
        request: &mut ConnectionRequest<'_>,
        cloud_name: &CloudName,
        secret_token: &str,
    ) -> Result<SigningReport, ConnectError> {
        // 1. Discovery
        let discovery = self.discovery.discover(cloud_name).await.map_err(|e| {
            warn!(cloud_name = %cloud_name, error = %e, "Discovery failed");
            ConnectError::DiscoveryFailed {
                name: cloud_name.to_string(),
                reason: e.to_string(),
            }
        })?;

        let (cloud_number, endpoint) = match (discovery.cloud_number, discovery.xdi_endpoint_url)
        {
            (Some(cloud_number), Some(endpoint)) => (cloud_number, endpoint),
            (cloud_number, endpoint) => {
                warn!(
                    cloud_name = %cloud_name,
                    has_cloud_number = cloud_number.is_some(),
                    has_endpoint = endpoint.is_some(),
                    "Discovery returned no cloud number or endpoint"
                );
                return Err(ConnectError::DiscoveryFailed {
                    name: cloud_name.to_string(),
                    reason: "no cloud number or XDI endpoint".to_string(),
                });
            }
        };
        debug!(cloud_number = %cloud_number, endpoint = %endpoint, "Discovered");

        // 2. Key retrieval
        let key_retrieval_failed = |reason: String| ConnectError::KeyRetrievalFailed {
            cloud_number: cloud_number.to_string(),
            reason,
        };
        let material = self
            .keys
            .retrieve_signature_private_key(&endpoint, &cloud_number, secret_token)
            .await
            .map_err(|e| key_retrieval_failed(e.to_string()))?
            .map(Zeroizing::new)
            .ok_or_else(|| key_retrieval_failed("no signature private key".to_string()))?;

        // 3. Decoding
        let key = RsaSigningKey::decode(&material)
            .map_err(|e| ConnectError::KeyDecodingError(e.to_string()))?;

        // 4. Signing
        let messages_signed = request.sign_with_key(&key).inspect_err(|e| {
            warn!(cloud_number = %cloud_number, error = %e, "Signing stopped");
        })?;

        info!(
            cloud_number = %cloud_number,
            messages = messages_signed,
            "Connection request signed"
        );

        Ok(SigningReport {
            signer: cloud_number,
            endpoint,
            messages_signed,
        })
    }

    async fn verify(&self, envelope: &MessageEnvelope) -> VerificationReport {
        let mut report = VerificationReport::default();

        for message in envelope.messages() {
            let outcome = self.verify_one(message).await;
            match &outcome {
                VerificationOutcome::Valid => {
                    debug!(message = %message.address, "Signature valid");
                }
                other => {
                    warn!(message = %message.address, outcome = ?other, "Message not verified");
                }
            }
            report.messages.push(MessageVerification {
                message: message.address.clone(),
                sender: message.sender.clone(),
                outcome,
            });
        }

        info!(
            messages = report.messages.len(),
            valid = report.valid_count(),
            "Envelope verified"
        );
        report
    }

    fn csp_logo(&self, endpoint: &str) -> &'static str {
        csp_logo_for_endpoint(endpoint)
    }
}
