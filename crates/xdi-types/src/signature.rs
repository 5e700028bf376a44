//! # Message Signatures
//!
//! A signature is tagged by its algorithm profile and carries the base64
//! signature value. It is created once and never mutated; re-signing a
//! message replaces the whole `Signature`.

use serde::{Deserialize, Serialize};

/// Digest algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-2 family (length selects the variant).
    Sha,
}

/// Key algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// RSA with PKCS#1 v1.5 padding.
    Rsa,
}

/// Algorithm profile a signature is created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureProfile {
    pub digest_algorithm: DigestAlgorithm,
    pub digest_length: u16,
    pub key_algorithm: KeyAlgorithm,
    pub key_length: u16,
    /// Whole-message coverage.
    pub singleton: bool,
}

impl SignatureProfile {
    /// SHA-256 digest, RSA-2048 key, whole-message coverage.
    pub const SHA256_RSA2048: Self = Self {
        digest_algorithm: DigestAlgorithm::Sha,
        digest_length: 256,
        key_algorithm: KeyAlgorithm::Rsa,
        key_length: 2048,
        singleton: true,
    };
}

/// A populated signature attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    profile: SignatureProfile,
    value: String,
}

impl Signature {
    /// Create a signature from its profile and base64 value.
    pub fn new(profile: SignatureProfile, value: impl Into<String>) -> Self {
        Self {
            profile,
            value: value.into(),
        }
    }

    pub fn profile(&self) -> &SignatureProfile {
        &self.profile
    }

    /// Base64-encoded signature bytes.
    pub fn value(&self) -> &str {
        &self.value
    }
}
