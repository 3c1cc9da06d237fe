//! Daemon-crate error types (§7: one `thiserror` enum per crate boundary).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the Port File, Listener, Token Store, Auth Gate, and
/// MCP Session components.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The port file's containing directory could not be created with the
    /// required 0700 permissions.
    #[error("failed to create port file directory {path}: {source}")]
    PortDirectory {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The port file could not be written.
    #[error("failed to write port file {path}: {source}")]
    PortFileWrite {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A loopback TCP bind failed for a reason other than address-in-use.
    #[error("failed to bind loopback listener: {0}")]
    BindFailed(#[source] std::io::Error),

    /// The listener was asked to restart more times than the supervisor
    /// allows within one interval, and is giving up.
    #[error("listener exhausted its restart budget")]
    ListenerExhausted,

    /// rmcp's server-side transport setup or serve loop failed.
    #[error("mcp session error: {0}")]
    Session(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
