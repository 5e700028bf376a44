//! # XDI Crypto - Message Signature Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `keys` | RSA (PKCS#8 / PKCS#1 / SPKI) | Decoding retrieved and published keys |
//! | `signing` | RSA PKCS#1 v1.5 + SHA-256 | Message signatures |
//! | `hashing` | SHA-256 | Payload fingerprints |
//!
//! ## Security Properties
//!
//! - **PKCS#1 v1.5**: deterministic signatures, no RNG needed for signing
//! - **Profile-bound keys**: a key whose size differs from the profile is rejected
//! - **Zeroized buffers**: decoded DER key material is wiped on drop

#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod keys;
pub mod signing;

/// Fixture keys (requires feature: `test-utils`)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{fingerprint, sha256};
pub use keys::{RsaSigningKey, RsaVerifyingKey};
pub use signing::{
    create_signature, sign_message, verify_message, verify_signature, SignatureScaffold,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
