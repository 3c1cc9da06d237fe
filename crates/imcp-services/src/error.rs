//! Errors raised by the registry, dispatcher, and the service catalog.

use thiserror::Error;

/// Errors raised by service dispatch.
#[derive(Debug, Error)]
pub enum ServicesError {
    /// `tools/call` named a tool with no entry in the precomputed
    /// `ToolName -> ServiceId` map.
    #[error("tool not found or service not enabled: {0}")]
    ToolNotFound(String),

    /// The token's permission level for the tool's service does not permit
    /// this tool (considering its `readOnlyHint`).
    #[error("permission denied for '{0}'")]
    PermissionDenied(String),

    /// The server-wide enabled flag is off.
    #[error("server is disabled")]
    ServerDisabled,

    /// A service's own `call` implementation failed.
    #[error("service call failed: {0}")]
    ServiceFailure(String),

    /// A service could not be activated (host permission denied, etc).
    #[error("service activation failed: {0}")]
    ActivationFailed(String),
}

/// Result type for service dispatch operations.
pub type ServicesResult<T> = Result<T, ServicesError>;
