//! # Connect Errors
//!
//! Error taxonomy for connection requests and results. Adapter errors
//! (`DiscoveryError`, `KeyRetrievalError`) and `CryptoError` are mapped into
//! these variants at the service boundary.

use thiserror::Error;

/// Errors raised by Connect operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// A required input was absent or rejected by the validity check
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Discovery failed or returned no cloud number / endpoint
    #[error("Discovery failed for {name}: {reason}")]
    DiscoveryFailed { name: String, reason: String },

    /// The endpoint returned no private key, or the call failed
    #[error("Key retrieval failed for {cloud_number}: {reason}")]
    KeyRetrievalFailed {
        cloud_number: String,
        reason: String,
    },

    /// Retrieved key material could not be decoded
    #[error("Key decoding failed: {0}")]
    KeyDecodingError(String),

    /// Signing stopped partway; the first `signed` messages keep their new signatures
    #[error("Signature creation failed after {signed} of {total} messages: {reason}")]
    SignatureCreationError {
        signed: usize,
        total: usize,
        reason: String,
    },

    /// A stored return URI does not parse
    #[error("Malformed URI '{value}': {reason}")]
    MalformedUri { value: String, reason: String },
}

impl ConnectError {
    /// Short stable name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectError::InvalidArgument(_) => "invalid_argument",
            ConnectError::DiscoveryFailed { .. } => "discovery_failed",
            ConnectError::KeyRetrievalFailed { .. } => "key_retrieval_failed",
            ConnectError::KeyDecodingError(_) => "key_decoding_error",
            ConnectError::SignatureCreationError { .. } => "signature_creation_error",
            ConnectError::MalformedUri { .. } => "malformed_uri",
        }
    }
}
