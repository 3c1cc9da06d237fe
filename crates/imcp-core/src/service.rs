//! Service and Tool vocabulary (§3 Data Model — Service, Tool; §6 Service
//! contract).
//!
//! The `Service` *trait* itself lives in `imcp-services`, since invoking one
//! is inherently async I/O and this crate stays dependency-light. What's
//! here is the data shared between the trait, the registry, and the wire
//! encoding: identifiers, the static tool catalog shape, and the tagged
//! result a service call produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable textual identifier for a `Service`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Construct a service id from a stable string identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of a [`Tool`], unique across the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToolName(String);

impl ToolName {
    /// Construct a tool name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ToolName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-tool annotations. `read_only_hint` is the sole criterion
/// distinguishing a tool under the `readOnly` permission level (§3).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// Whether the tool only reads host state.
    pub read_only_hint: bool,
}

/// A named, schema-typed operation exposed by a `Service`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique name across the whole catalog.
    pub name: ToolName,
    /// Human-readable description shown to the assistant client.
    pub description: String,
    /// JSON Schema describing the tool's input object.
    pub input_schema: Value,
    /// Annotations, at minimum `readOnlyHint`.
    pub annotations: ToolAnnotations,
}

impl Tool {
    /// Convenience constructor for a tool with no input parameters.
    #[must_use]
    pub fn no_args(name: impl Into<String>, description: impl Into<String>, read_only: bool) -> Self {
        Self {
            name: ToolName::new(name),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
            annotations: ToolAnnotations {
                read_only_hint: read_only,
            },
        }
    }
}

/// A typed binary result from a service call, e.g. a photo or audio clip.
#[derive(Debug, Clone)]
pub struct Blob {
    /// MIME type, e.g. `image/jpeg` or `audio/mpeg`.
    pub mime_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// The result of invoking `Service::call`.
///
/// Mirrors the abstract contract in §6: a service may produce structured
/// data, a binary blob, or decline to handle the call.
#[derive(Debug, Clone)]
pub enum ServiceOutcome {
    /// Structured JSON data, to be wire-encoded as a text content block.
    Value(Value),
    /// A binary blob, to be base64-wrapped with its MIME type.
    Blob(Blob),
    /// The service does not recognize this tool name (legacy fall-through
    /// contract — see SPEC_FULL.md §9 Open Questions; unreachable once the
    /// dispatcher's `ToolName -> ServiceId` map is authoritative).
    NotHandled,
}
