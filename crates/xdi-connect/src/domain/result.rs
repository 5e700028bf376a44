//! # Connection Result
//!
//! Non-owning view over the message result a peer returns for a connection
//! request. It exposes who answered (the cloud number owning the result
//! graph) and which link contracts were granted.

use crate::domain::errors::ConnectError;
use xdi_types::{CloudNumber, LinkContracts, MessageResult};

/// Connection result over a borrowed message result.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionResult<'a> {
    result: &'a MessageResult,
}

impl<'a> ConnectionResult<'a> {
    /// Validity hook applied by [`ConnectionResult::from_result`]. Accepts every result.
    pub fn is_valid(_result: &MessageResult) -> bool {
        true
    }

    pub fn from_result(result: &'a MessageResult) -> Result<Self, ConnectError> {
        Self::from_result_checked(result, Self::is_valid)
    }

    pub fn from_result_checked(
        result: &'a MessageResult,
        check: impl Fn(&MessageResult) -> bool,
    ) -> Result<Self, ConnectError> {
        if !check(result) {
            return Err(ConnectError::InvalidArgument(
                "message result is not a valid connection result".to_string(),
            ));
        }
        Ok(Self { result })
    }

    /// Wrap a result that may be missing.
    pub fn from_optional_result(result: Option<&'a MessageResult>) -> Result<Self, ConnectError> {
        let result = result.ok_or_else(|| {
            ConnectError::InvalidArgument("message result is required".to_string())
        })?;
        Self::from_result(result)
    }

    pub fn message_result(&self) -> &'a MessageResult {
        self.result
    }

    /// Cloud number of the responder, from the graph owner address.
    ///
    /// `None` when the graph has no owner or the owner is not a cloud number.
    pub fn cloud_number(&self) -> Option<CloudNumber> {
        self.result
            .graph()
            .owner_address()
            .and_then(CloudNumber::from_address)
    }

    /// Link contracts in the result graph, yielded lazily in statement order.
    pub fn link_contracts(&self) -> LinkContracts<'a> {
        self.result.graph().link_contracts()
    }
}
