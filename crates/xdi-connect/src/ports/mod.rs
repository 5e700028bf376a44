//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that callers use
//! - **Outbound (Driven)**: discovery and key retrieval collaborators

pub mod inbound;
pub mod outbound;
