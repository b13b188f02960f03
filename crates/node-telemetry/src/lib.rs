//! # Node Telemetry
//!
//! Structured logging for ledger node binaries, built on `tracing` and
//! `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use node_telemetry::{init_logging, LogConfig};
//!
//! fn main() {
//!     let config = LogConfig::for_service("mempool-cli");
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEDGER_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `LEDGER_JSON_LOGS` | `false` | One JSON object per event |
//! | `LEDGER_LOG_SOURCE` | `false` | Include file and line |
//! | `LEDGER_SERVICE_NAME` | `ledger-node` | Service name |

mod config;
mod logging;

pub use config::LogConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Logging initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}
