//! Bridge-crate error types (§7: one `thiserror` enum per crate boundary).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the stdio<->TCP bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The port file never appeared within the polling budget (§4.H
    /// Startup: "read the Port File with the 30-second polling budget").
    #[error("timed out waiting for port file {path} after {budget_secs}s")]
    PortFileTimeout {
        /// The path that was polled.
        path: PathBuf,
        /// The polling budget, in seconds.
        budget_secs: u64,
    },

    /// The port file existed but did not contain a valid decimal port.
    #[error("port file {path} does not contain a valid port: {source}")]
    MalformedPortFile {
        /// The path that was read.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// Connecting to the server's loopback port failed.
    #[error("failed to connect to 127.0.0.1:{port}: {source}")]
    Connect {
        /// The port that was dialed.
        port: u16,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the token preamble failed.
    #[error("failed to write token preamble: {0}")]
    TokenWrite(#[source] std::io::Error),

    /// The remote end was reset or otherwise reports it is not connected
    /// (§4.H Retry policy: "connection-reset / not-connected terminate
    /// the bridge").
    #[error("remote connection lost: {0}")]
    RemoteLost(#[source] std::io::Error),

    /// Reading from stdin failed.
    #[error("failed to read stdin: {0}")]
    StdinRead(#[source] std::io::Error),

    /// Writing to stdout failed.
    #[error("failed to write stdout: {0}")]
    StdoutWrite(#[source] std::io::Error),

    /// Reading from the TCP connection failed for a reason other than
    /// reset/not-connected.
    #[error("failed to read from server: {0}")]
    TcpRead(#[source] std::io::Error),

    /// Writing to the TCP connection failed for a reason other than
    /// reset/not-connected.
    #[error("failed to write to server: {0}")]
    TcpWrite(#[source] std::io::Error),
}

impl BridgeError {
    /// Whether this error is a connection-reset / not-connected class
    /// error that should terminate the bridge outright, rather than
    /// trigger a reconnect (§4.H Retry policy).
    #[must_use]
    pub fn is_remote_lost(&self) -> bool {
        let io_error = match self {
            BridgeError::Connect { source, .. }
            | BridgeError::TcpRead(source)
            | BridgeError::TcpWrite(source)
            | BridgeError::TokenWrite(source)
            | BridgeError::RemoteLost(source) => Some(source),
            _ => None,
        };
        io_error.is_some_and(|err| {
            matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::NotConnected | std::io::ErrorKind::BrokenPipe
            )
        })
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
