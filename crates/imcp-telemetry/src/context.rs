//! Per-request correlation context.
//!
//! Wraps a `tracing::Span` carrying a stable request id, so log lines from
//! one MCP session's handlers — across whatever tasks a single `CallTool`
//! touches — can be correlated without threading an id through every
//! function signature by hand.

use tracing::Span;

/// A correlation context for one logical unit of work (an MCP session, or
/// one request within it).
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    component: String,
    operation: Option<String>,
}

impl RequestContext {
    /// Start a context for `component` (e.g. `"mcp_session"`,
    /// `"message_watcher"`), generating a fresh request id.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            component: component.into(),
            operation: None,
        }
    }

    /// Attach the specific operation being performed, e.g. a tool name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// The generated request id.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Build the `tracing::Span` this context describes. Entering it
    /// returns a [`RequestGuard`] for the duration of the work.
    #[must_use]
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            component = %self.component,
            operation = self.operation.as_deref().unwrap_or("-"),
        )
    }
}

/// A span guard returned by entering a [`RequestContext`]'s span. Exists as
/// a type alias target so call sites don't need to name
/// `tracing::span::Entered` directly.
pub type RequestGuard<'a> = tracing::span::Entered<'a>;
