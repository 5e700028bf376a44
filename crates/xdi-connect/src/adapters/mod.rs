//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

#[cfg(feature = "http")]
pub mod http;
pub mod memory;
