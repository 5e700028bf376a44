//! # Message Signatures (RSA PKCS#1 v1.5 / SHA-256)
//!
//! Signing is a two-step contract:
//!
//! 1. [`create_signature`] checks the algorithm profile and returns a
//!    [`SignatureScaffold`].
//! 2. [`SignatureScaffold::populate`] signs a payload with a private key and
//!    yields an immutable [`Signature`].
//!
//! The only supported profile is SHA-256 with RSA. The key must have exactly
//! the length named by the profile.

use crate::hashing::fingerprint;
use crate::keys::{RsaSigningKey, RsaVerifyingKey};
use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1v15;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha256;
use tracing::debug;
use xdi_types::{DigestAlgorithm, KeyAlgorithm, Message, Signature, SignatureProfile};

/// A signature that has a profile but no value yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureScaffold {
    profile: SignatureProfile,
}

/// Start a signature under `profile`.
///
/// # Errors
/// * `CryptoError::UnsupportedProfile` - digest is not SHA-256 or key is not RSA
pub fn create_signature(profile: SignatureProfile) -> Result<SignatureScaffold, CryptoError> {
    ensure_supported(&profile)?;
    Ok(SignatureScaffold { profile })
}

impl SignatureScaffold {
    pub fn profile(&self) -> &SignatureProfile {
        &self.profile
    }

    /// Sign `payload` and produce the finished signature.
    ///
    /// # Errors
    /// * `CryptoError::InvalidKeyLength` - key size differs from the profile
    /// * `CryptoError::SigningFailed` - the RSA operation failed
    pub fn populate(self, key: &RsaSigningKey, payload: &[u8]) -> Result<Signature, CryptoError> {
        let expected = usize::from(self.profile.key_length);
        let actual = key.key_bits();
        if actual != expected {
            return Err(CryptoError::InvalidKeyLength { expected, actual });
        }

        let signer = pkcs1v15::SigningKey::<Sha256>::new(key.inner().clone());
        let signature = signer
            .try_sign(payload)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        debug!(payload = %fingerprint(payload), "Payload signed");

        Ok(Signature::new(
            self.profile,
            STANDARD.encode(signature.to_bytes()),
        ))
    }
}

/// Verify `signature` over `payload`.
///
/// # Errors
/// * `CryptoError::UnsupportedProfile` - signature was made under another profile
/// * `CryptoError::InvalidSignatureFormat` - value is not base64 or has the wrong size
/// * `CryptoError::SignatureVerificationFailed` - signature does not match
pub fn verify_signature(
    signature: &Signature,
    key: &RsaVerifyingKey,
    payload: &[u8],
) -> Result<(), CryptoError> {
    ensure_supported(signature.profile())?;

    let bytes = STANDARD
        .decode(signature.value())
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;
    let signature = pkcs1v15::Signature::try_from(bytes.as_slice())
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;

    pkcs1v15::VerifyingKey::<Sha256>::new(key.inner().clone())
        .verify(payload, &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Sign a whole message and attach the signature, replacing any earlier one.
pub fn sign_message(
    message: &mut Message,
    profile: SignatureProfile,
    key: &RsaSigningKey,
) -> Result<(), CryptoError> {
    let scaffold = create_signature(profile)?;
    let payload = message
        .signing_bytes()
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    let signature = scaffold.populate(key, &payload)?;
    message.attach_signature(signature);
    Ok(())
}

/// Verify the signature attached to a message.
///
/// # Errors
/// * `CryptoError::MissingSignature` - the message is unsigned
/// * any error from [`verify_signature`]
pub fn verify_message(message: &Message, key: &RsaVerifyingKey) -> Result<(), CryptoError> {
    let signature = message.signature().ok_or(CryptoError::MissingSignature)?;
    let payload = message
        .signing_bytes()
        .map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    verify_signature(signature, key, &payload)
}

fn ensure_supported(profile: &SignatureProfile) -> Result<(), CryptoError> {
    let supported = profile.digest_algorithm == DigestAlgorithm::Sha
        && profile.digest_length == 256
        && profile.key_algorithm == KeyAlgorithm::Rsa;

    if supported {
        Ok(())
    } else {
        Err(CryptoError::UnsupportedProfile(format!(
            "{:?}-{} / {:?}-{}",
            profile.digest_algorithm,
            profile.digest_length,
            profile.key_algorithm,
            profile.key_length
        )))
    }
}
