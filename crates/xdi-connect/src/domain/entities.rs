//! # Domain Entities
//!
//! Values exchanged between the Connect service and its collaborators.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use url::Url;
use xdi_types::{CloudNumber, XdiAddress};

// =============================================================================
// Discovery
// =============================================================================

/// Outcome of resolving a cloud name or cloud number.
///
/// Every field may be absent; the service decides which gaps are fatal.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// The address that was looked up
    pub query: String,
    #[serde(default)]
    pub cloud_number: Option<CloudNumber>,
    #[serde(default)]
    pub xdi_endpoint_url: Option<Url>,
    /// Published signature public key (PEM or base64 DER)
    #[serde(default)]
    pub signature_public_key: Option<String>,
}

impl DiscoveryResult {
    /// A result that resolved nothing.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cloud_number.is_none() && self.xdi_endpoint_url.is_none()
    }
}

// =============================================================================
// Signing
// =============================================================================

/// Summary of a completed `sign` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SigningReport {
    /// Cloud number the key was retrieved for
    pub signer: CloudNumber,
    pub endpoint: Url,
    pub messages_signed: usize,
}

// =============================================================================
// Verification
// =============================================================================

/// Result of checking one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Valid,
    /// No signature attached
    Unsigned,
    /// The sender has no usable public key
    SenderUnknown(String),
    /// The signature does not check out
    Invalid(String),
}

/// Per-message verification entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageVerification {
    pub message: XdiAddress,
    pub sender: XdiAddress,
    pub outcome: VerificationOutcome,
}

/// Verification results for a whole envelope, in message order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub messages: Vec<MessageVerification>,
}

impl VerificationReport {
    /// True when the envelope has messages and every one verified.
    pub fn all_valid(&self) -> bool {
        !self.messages.is_empty()
            && self
                .messages
                .iter()
                .all(|m| m.outcome == VerificationOutcome::Valid)
    }

    pub fn valid_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.outcome == VerificationOutcome::Valid)
            .count()
    }
}
