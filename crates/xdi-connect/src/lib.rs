//! # XDI Connect
//!
//! Connection requests, their signing, and the results peers send back.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): connection request/result views, logo table, errors
//! - **Ports Layer** (`ports/`): the `ConnectApi` and the discovery / key retrieval SPI
//! - **Service Layer** (`service.rs`): sign and verify orchestration
//! - **Adapters** (`adapters/`): HTTP and in-memory collaborators
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use xdi_connect::adapters::memory::InMemoryRegistry;
//! use xdi_connect::{ConnectApi, ConnectService, ConnectionRequest};
//! use xdi_types::{CloudName, MessageEnvelope};
//!
//! let registry = InMemoryRegistry::from_json(&std::fs::read_to_string("registry.json")?)?;
//! let service = ConnectService::new(registry.clone(), registry);
//!
//! let mut envelope = MessageEnvelope::from_json(&std::fs::read_to_string("request.json")?)?;
//! let mut request = ConnectionRequest::from_envelope(&mut envelope)?;
//! request.set_short_flag(true);
//! service.sign(&mut request, &CloudName::parse("=alice")?, "s3cret").await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use config::{ConfigError, ConnectConfig};
pub use domain::csp::{csp_logo_for_endpoint, DEFAULT_CSP_LOGO};
pub use domain::entities::{
    DiscoveryResult, MessageVerification, SigningReport, VerificationOutcome, VerificationReport,
};
pub use domain::errors::ConnectError;
pub use domain::request::{ConnectionRequest, RETURN_URI_PARAMETER, SHORT_PARAMETER};
pub use domain::result::ConnectionResult;
pub use domain::uri::ReturnUri;
pub use ports::inbound::ConnectApi;
pub use ports::outbound::{DiscoveryClient, DiscoveryError, KeyRetrievalClient, KeyRetrievalError};
pub use service::ConnectService;
