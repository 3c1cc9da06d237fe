//! Session identity (§3 Data Model — Session).
//!
//! The full session record (transport handle, liveness, authenticated
//! token) is owned by the daemon, which has the I/O to back it. This crate
//! only owns the stable id so log lines and error messages in any crate can
//! refer to "which connection" without depending on the daemon.

use std::fmt;

/// Stable, opaque identifier for one accepted TCP connection's MCP session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
