//! # XDI Types Crate
//!
//! The slice of the XDI data model that the Connect crates operate on.
//!
//! ## Design Principles
//!
//! - **Validated Addresses**: `XdiAddress`, `CloudName` and `CloudNumber` can
//!   only be constructed through parsing, so downstream code never sees a
//!   malformed identifier.
//! - **Owned Envelopes**: `MessageEnvelope` owns its messages; wrappers in
//!   `xdi-connect` borrow it and mutate it in place.
//! - **Ordered Graphs**: `Graph` keeps statements in insertion order, which is
//!   the traversal order of every query it offers.
//!
//! This is not a general XDI graph engine. It models exactly what a
//! connection request and its result carry.

pub mod envelope;
pub mod errors;
pub mod graph;
pub mod signature;
pub mod syntax;

pub use envelope::{Literal, Message, MessageEnvelope, Operation, OperationKind};
pub use errors::XdiError;
pub use graph::{Graph, LinkContract, LinkContracts, MessageResult, Permission, Statement};
pub use signature::{DigestAlgorithm, KeyAlgorithm, Signature, SignatureProfile};
pub use syntax::{CloudName, CloudNumber, XdiAddress};
