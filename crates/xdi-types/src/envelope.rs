//! # Messages and Envelopes
//!
//! A `MessageEnvelope` is an ordered container of `Message`s. Each message
//! carries its sender, optional routing (to-peer root, link contract), an
//! ordered list of operations, named literal parameters, and at most one
//! signature.
//!
//! ## Signed Content
//!
//! The signed payload of a message is the canonical JSON encoding of every
//! field except the signature. Parameters live in a `BTreeMap`, so the
//! encoding is stable regardless of insertion order.

use crate::errors::XdiError;
use crate::signature::Signature;
use crate::syntax::XdiAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// LITERALS
// =============================================================================

/// Literal parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Operation verbs a message can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "$get")]
    Get,
    #[serde(rename = "$set")]
    Set,
    #[serde(rename = "$del")]
    Del,
    #[serde(rename = "$connect")]
    Connect,
    #[serde(rename = "$send")]
    Send,
    #[serde(rename = "$push")]
    Push,
}

/// A single operation on a target address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub target: XdiAddress,
}

// =============================================================================
// MESSAGE
// =============================================================================

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message address, `<sender>[$msg]*!:uuid:<id>`.
    pub address: XdiAddress,
    pub sender: XdiAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_peer_root: Option<XdiAddress>,
    /// Link contract the message is sent under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_contract: Option<XdiAddress>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub parameters: BTreeMap<XdiAddress, Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<Signature>,
}

/// Borrowed view of the signed fields of a message.
#[derive(Serialize)]
struct SignedContent<'a> {
    address: &'a XdiAddress,
    sender: &'a XdiAddress,
    to_peer_root: &'a Option<XdiAddress>,
    link_contract: &'a Option<XdiAddress>,
    operations: &'a [Operation],
    parameters: &'a BTreeMap<XdiAddress, Literal>,
}

impl Message {
    /// Create an empty message from `sender` with a fresh message address.
    pub fn new(sender: XdiAddress) -> Self {
        let address =
            XdiAddress::from_trusted(format!("{}[$msg]*!:uuid:{}", sender, Uuid::new_v4()));
        Self {
            address,
            sender,
            to_peer_root: None,
            link_contract: None,
            operations: Vec::new(),
            parameters: BTreeMap::new(),
            signature: None,
        }
    }

    pub fn add_operation(&mut self, kind: OperationKind, target: XdiAddress) -> &mut Self {
        self.operations.push(Operation { kind, target });
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Literal> {
        self.parameters.get(name)
    }

    /// Set a parameter, replacing any previous value.
    pub fn set_parameter(&mut self, name: XdiAddress, value: Literal) {
        self.parameters.insert(name, value);
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Attach a signature, replacing any previous one.
    pub fn attach_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }

    /// Canonical bytes covered by a whole-message signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, XdiError> {
        let content = SignedContent {
            address: &self.address,
            sender: &self.sender,
            to_peer_root: &self.to_peer_root,
            link_contract: &self.link_contract,
            operations: &self.operations,
            parameters: &self.parameters,
        };
        Ok(serde_json::to_vec(&content)?)
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Ordered collection of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    messages: Vec<Message>,
}

impl MessageEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new empty message from `sender` and return it for editing.
    pub fn create_message(&mut self, sender: XdiAddress) -> &mut Message {
        let index = self.messages.len();
        self.messages.push(Message::new(sender));
        &mut self.messages[index]
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    pub fn first_message(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn to_json(&self) -> Result<String, XdiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, XdiError> {
        Ok(serde_json::from_str(json)?)
    }
}
