//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The global tracing subscriber was already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),

    /// A log-file target could not be opened.
    #[error("failed to open log file: {0}")]
    IoError(#[from] std::io::Error),

    /// The `RUST_LOG`-style directive string could not be parsed.
    #[error("invalid log directive: {0}")]
    InvalidDirective(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
