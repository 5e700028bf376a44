//! # Connect Telemetry
//!
//! Logging setup shared by the XDI Connect binaries and tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use connect_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_component("cli");
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `XDI_SERVICE_NAME` | `xdi-connect` | Service name in the startup log line |
//! | `XDI_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `XDI_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `XDI_JSON_LOGS` | `false` | JSON log lines (defaults to `true` in containers) |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;
    tracing::info!(service = %config.full_service_name(), "Telemetry initialized");
    Ok(())
}

/// Convenience macro for creating a span with component context.
///
/// # Example
///
/// ```rust,ignore
/// use connect_telemetry::connect_span;
///
/// fn sign_envelope() {
///     let _span = connect_span!("sign_envelope", component = "connect", messages = 3);
///     // ... signing logic
/// }
/// ```
#[macro_export]
macro_rules! connect_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
