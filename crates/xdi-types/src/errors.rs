//! # Error Types
//!
//! Parsing and serialisation errors for the XDI model.

use thiserror::Error;

/// Errors raised while parsing or serialising XDI values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XdiError {
    /// Address text does not follow the address rules.
    #[error("Invalid XDI address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Address is valid but is not a cloud name.
    #[error("Not a cloud name: {0}")]
    InvalidCloudName(String),

    /// Address is valid but is not a cloud number.
    #[error("Not a cloud number: {0}")]
    InvalidCloudNumber(String),

    /// Statement text could not be split into subject, predicate and object.
    #[error("Invalid statement '{statement}': {reason}")]
    InvalidStatement { statement: String, reason: String },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for XdiError {
    fn from(err: serde_json::Error) -> Self {
        XdiError::Serialization(err.to_string())
    }
}
