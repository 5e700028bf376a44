//! # RSA Key Decoding
//!
//! Key material arrives as text from the key retrieval endpoint or the
//! discovery registry. Accepted encodings:
//!
//! | Input | Private key | Public key |
//! |-------|-------------|------------|
//! | PEM | `PRIVATE KEY` (PKCS#8), `RSA PRIVATE KEY` (PKCS#1) | `PUBLIC KEY` (SPKI), `RSA PUBLIC KEY` (PKCS#1) |
//! | base64 DER | PKCS#8, then PKCS#1 | SPKI, then PKCS#1 |
//!
//! Decoded intermediate buffers are zeroized on drop.

use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

const PEM_PREFIX: &str = "-----BEGIN";

/// RSA private key used to sign messages.
#[derive(Clone)]
pub struct RsaSigningKey {
    inner: RsaPrivateKey,
}

impl RsaSigningKey {
    /// Decode private key material (PEM or base64 DER).
    pub fn decode(material: &str) -> Result<Self, CryptoError> {
        let material = material.trim();

        let inner = if material.starts_with(PEM_PREFIX) {
            if material.contains("BEGIN RSA PRIVATE KEY") {
                RsaPrivateKey::from_pkcs1_pem(material)
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
            } else {
                RsaPrivateKey::from_pkcs8_pem(material)
                    .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
            }
        } else {
            let der = decode_base64(material).map_err(CryptoError::InvalidPrivateKey)?;
            RsaPrivateKey::from_pkcs8_der(&der)
                .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?
        };

        Ok(Self { inner })
    }

    /// Modulus size in bits.
    pub fn key_bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// Matching public key.
    pub fn verifying_key(&self) -> RsaVerifyingKey {
        RsaVerifyingKey {
            inner: self.inner.to_public_key(),
        }
    }

    pub(crate) fn inner(&self) -> &RsaPrivateKey {
        &self.inner
    }
}

impl fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigningKey")
            .field("bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

/// RSA public key used to verify message signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaVerifyingKey {
    inner: RsaPublicKey,
}

impl RsaVerifyingKey {
    /// Decode public key material (PEM or base64 DER).
    pub fn decode(material: &str) -> Result<Self, CryptoError> {
        let material = material.trim();

        let inner = if material.starts_with(PEM_PREFIX) {
            if material.contains("BEGIN RSA PUBLIC KEY") {
                RsaPublicKey::from_pkcs1_pem(material)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?
            } else {
                RsaPublicKey::from_public_key_pem(material)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?
            }
        } else {
            let der = decode_base64(material).map_err(CryptoError::InvalidPublicKey)?;
            RsaPublicKey::from_public_key_der(&der)
                .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
                .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?
        };

        Ok(Self { inner })
    }

    /// Modulus size in bits.
    pub fn key_bits(&self) -> usize {
        self.inner.n().bits()
    }

    /// SPKI PEM encoding.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.inner
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.inner
    }
}

fn decode_base64(material: &str) -> Result<Zeroizing<Vec<u8>>, String> {
    if material.is_empty() {
        return Err("empty key material".to_string());
    }
    let compact: Zeroizing<String> = Zeroizing::new(
        material
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    );
    STANDARD
        .decode(compact.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| e.to_string())
}
