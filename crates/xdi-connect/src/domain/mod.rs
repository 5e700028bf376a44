//! # Domain Layer
//!
//! Connection requests and results over the XDI message model, the
//! provider logo table, and the error taxonomy. No I/O happens here.

pub mod csp;
pub mod entities;
pub mod errors;
pub mod request;
pub mod result;
pub mod uri;
