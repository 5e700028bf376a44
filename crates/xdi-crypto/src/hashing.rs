//! # SHA-256 Hashing
//!
//! Digest helpers for signed payloads. The RSA signer hashes internally; these
//! are used to fingerprint payloads and keys in logs and reports.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// SHA-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha256::digest(data));
    hash
}

/// Short printable fingerprint: base64 of the first 12 digest bytes.
pub fn fingerprint(data: &[u8]) -> String {
    STANDARD.encode(&sha256(data)[..12])
}
