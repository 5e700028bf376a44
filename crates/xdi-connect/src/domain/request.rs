//! # Connection Request
//!
//! Non-owning view over a message envelope that carries a `$connect`
//! request. Parameters are read from the first message and written to every
//! message, so all messages in the envelope agree.
//!
//! | Parameter | Address | Type |
//! |-----------|---------|------|
//! | return URI | `<#return><$uri>` | URI reference string |
//! | short | `<#short>` | boolean |

use crate::domain::errors::ConnectError;
use crate::domain::uri::ReturnUri;
use tracing::debug;
use xdi_crypto::{sign_message, RsaSigningKey};
use xdi_types::{
    CloudNumber, Literal, MessageEnvelope, OperationKind, SignatureProfile, XdiAddress,
};

/// Parameter holding the URI the responder redirects to.
pub const RETURN_URI_PARAMETER: &str = "<#return><$uri>";

/// Parameter asking for a short-form response.
pub const SHORT_PARAMETER: &str = "<#short>";

/// Profile used for every connection-request signature.
pub const CONNECT_SIGNATURE_PROFILE: SignatureProfile = SignatureProfile::SHA256_RSA2048;

/// Connection request over a borrowed envelope.
#[derive(Debug)]
pub struct ConnectionRequest<'a> {
    envelope: &'a mut MessageEnvelope,
}

impl<'a> ConnectionRequest<'a> {
    /// Validity hook applied by [`ConnectionRequest::from_envelope`]. Accepts every envelope.
    pub fn is_valid(_envelope: &MessageEnvelope) -> bool {
        true
    }

    /// Wrap an envelope.
    ///
    /// # Errors
    /// * `ConnectError::InvalidArgument` - the envelope fails [`ConnectionRequest::is_valid`]
    pub fn from_envelope(envelope: &'a mut MessageEnvelope) -> Result<Self, ConnectError> {
        Self::from_envelope_checked(envelope, Self::is_valid)
    }

    /// Wrap an envelope, accepting it only if `check` holds.
    pub fn from_envelope_checked(
        envelope: &'a mut MessageEnvelope,
        check: impl Fn(&MessageEnvelope) -> bool,
    ) -> Result<Self, ConnectError> {
        if !check(envelope) {
            return Err(ConnectError::InvalidArgument(
                "message envelope is not a valid connection request".to_string(),
            ));
        }
        Ok(Self { envelope })
    }

    /// Wrap an envelope that may be missing.
    pub fn from_optional_envelope(
        envelope: Option<&'a mut MessageEnvelope>,
    ) -> Result<Self, ConnectError> {
        let envelope = envelope.ok_or_else(|| {
            ConnectError::InvalidArgument("message envelope is required".to_string())
        })?;
        Self::from_envelope(envelope)
    }

    /// New one-message envelope asking `to_peer_root` to instantiate `template`.
    ///
    /// The message carries a `$connect` operation targeting the template
    /// address and is sent under the peer's public link contract.
    pub fn build(
        sender: &CloudNumber,
        to_peer_root: &CloudNumber,
        template: &XdiAddress,
    ) -> MessageEnvelope {
        let mut envelope = MessageEnvelope::new();
        let message = envelope.create_message(sender.address().clone());
        message.to_peer_root = Some(to_peer_root.address().clone());
        message.link_contract = Some(XdiAddress::from_static("$public$do"));
        message.add_operation(OperationKind::Connect, template.clone());
        envelope
    }

    pub fn envelope(&self) -> &MessageEnvelope {
        self.envelope
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Return URI from the first message, exactly as stored.
    ///
    /// # Errors
    /// * `ConnectError::MalformedUri` - the stored value is not a string or not a URI reference
    pub fn return_uri(&self) -> Result<Option<ReturnUri>, ConnectError> {
        let Some(value) = self
            .envelope
            .first_message()
            .and_then(|message| message.parameter(RETURN_URI_PARAMETER))
        else {
            return Ok(None);
        };

        let text = value.as_str().ok_or_else(|| ConnectError::MalformedUri {
            value: literal_text(value),
            reason: "not a string literal".to_string(),
        })?;

        ReturnUri::parse(text).map(Some)
    }

    /// Set the return URI on every message.
    pub fn set_return_uri(&mut self, uri: impl Into<ReturnUri>) {
        let uri: ReturnUri = uri.into();
        self.set_parameter(RETURN_URI_PARAMETER, Literal::from(uri.as_str()));
    }

    /// Short flag from the first message. Non-boolean values read as `None`.
    pub fn short_flag(&self) -> Option<bool> {
        self.envelope
            .first_message()
            .and_then(|message| message.parameter(SHORT_PARAMETER))
            .and_then(Literal::as_bool)
    }

    /// Set the short flag on every message.
    pub fn set_short_flag(&mut self, short: bool) {
        self.set_parameter(SHORT_PARAMETER, Literal::from(short));
    }

    fn set_parameter(&mut self, name: &'static str, value: Literal) {
        let name = XdiAddress::from_static(name);
        for message in self.envelope.messages_mut() {
            message.set_parameter(name.clone(), value.clone());
        }
    }

    // =========================================================================
    // Signing
    // =========================================================================

    /// Sign every message with `key` and return how many were signed.
    ///
    /// Not transactional: when a message fails, the ones before it keep
    /// their new signatures and the rest are left untouched.
    ///
    /// # Errors
    /// * `ConnectError::SignatureCreationError` - a signature could not be created
    pub fn sign_with_key(&mut self, key: &RsaSigningKey) -> Result<usize, ConnectError> {
        let total = self.envelope.len();

        for (signed, message) in self.envelope.messages_mut().iter_mut().enumerate() {
            sign_message(message, CONNECT_SIGNATURE_PROFILE, key).map_err(|e| {
                ConnectError::SignatureCreationError {
                    signed,
                    total,
                    reason: e.to_string(),
                }
            })?;
            debug!(message = %message.address, "Message signed");
        }

        Ok(total)
    }
}

fn literal_text(value: &Literal) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
