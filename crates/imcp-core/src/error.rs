//! Core error types shared across the workspace.

use thiserror::Error;

/// Errors raised by the core types (token/service/tool vocabulary).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A hex secret string was not exactly 64 lowercase hex characters.
    #[error("malformed secret: expected 64 lowercase hex characters")]
    MalformedSecret,

    /// A service ID referenced a service that is not in the registry.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// A tool name referenced a tool that is not in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Serialization of a tool result failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
