//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key material could not be decoded as an RSA private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Key material could not be decoded as an RSA public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Key size does not match the signature profile
    #[error("Invalid key length: expected {expected} bits, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bits
        expected: usize,
        /// Actual key length in bits
        actual: usize,
    },

    /// Signature profile is not supported by this crate
    #[error("Unsupported signature profile: {0}")]
    UnsupportedProfile(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Message carries no signature
    #[error("Message is not signed")]
    MissingSignature,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Payload could not be produced for signing
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
