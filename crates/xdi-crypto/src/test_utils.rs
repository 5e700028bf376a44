//! Fixture RSA keys for tests.
//!
//! Enable with the `test-utils` feature flag. Keys were generated once with
//! OpenSSL and are checked in under `testdata/`; never use them outside tests.

use crate::keys::RsaSigningKey;

/// 2048-bit PKCS#8 PEM private key of the default test signer.
pub const SIGNER_PRIVATE_KEY_PEM: &str = include_str!("../testdata/signer_2048.pem");

/// The same signer key in PKCS#1 PEM form.
pub const SIGNER_PRIVATE_KEY_PKCS1_PEM: &str = include_str!("../testdata/signer_2048_pkcs1.pem");

/// SPKI PEM public key of the default test signer.
pub const SIGNER_PUBLIC_KEY_PEM: &str = include_str!("../testdata/signer_2048.pub.pem");

/// 2048-bit PKCS#8 PEM private key unrelated to the signer.
pub const OTHER_PRIVATE_KEY_PEM: &str = include_str!("../testdata/other_2048.pem");

/// SPKI PEM public key matching `OTHER_PRIVATE_KEY_PEM`.
pub const OTHER_PUBLIC_KEY_PEM: &str = include_str!("../testdata/other_2048.pub.pem");

/// 1024-bit PKCS#8 PEM private key, too short for the default profile.
pub const SHORT_PRIVATE_KEY_PEM: &str = include_str!("../testdata/short_1024.pem");

/// 2044-bit PKCS#8 PEM private key; same byte length as a 2048-bit modulus.
pub const ODD_PRIVATE_KEY_PEM: &str = include_str!("../testdata/odd_2044.pem");

/// Decoded default signer key.
pub fn signer_key() -> RsaSigningKey {
    RsaSigningKey::decode(SIGNER_PRIVATE_KEY_PEM).expect("fixture key must decode")
}

/// Decoded unrelated key.
pub fn other_key() -> RsaSigningKey {
    RsaSigningKey::decode(OTHER_PRIVATE_KEY_PEM).expect("fixture key must decode")
}
