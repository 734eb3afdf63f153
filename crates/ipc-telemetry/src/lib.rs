//! # IPC Telemetry
//!
//! Structured logging for the IPC subnet control crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ipc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env("gateway", "/r1");
//! let _guard = init_telemetry(config)?;
//! ```
//!
//! `IPC_LOG` sets the filter (`RUST_LOG` takes precedence) and
//! `IPC_LOG_FORMAT` picks `pretty`, `json` or `off`.

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{build_filter, init_logging, LoggingHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),

    /// Invalid configuration, usually a bad filter directive
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let handle = init_logging(&config)?;
    Ok(TelemetryGuard { handle })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    handle: LoggingHandle,
}

impl TelemetryGuard {
    /// Component logging was installed for.
    pub fn component(&self) -> &str {
        &self.handle.component
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(component = %self.handle.component, "Shutting down telemetry");
    }
}
