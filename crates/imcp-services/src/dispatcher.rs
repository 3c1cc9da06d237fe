//! Permission-gated `ListTools`/`CallTool` dispatch (§4.F).
//!
//! The dispatcher is the only thing that sees both a [`Token`] and the
//! [`ServiceRegistry`]; individual services never see the permission model.
//! It is permission-checked twice per call — once implicitly by whatever
//! `ListTools` the client last saw, once explicitly here — because a
//! `ListTools` result can go stale the moment a token's permissions change.

use std::sync::Arc;

use base64::Engine as _;
use imcp_core::{Permission, ServiceOutcome, Token, Tool, ToolName};
use imcp_telemetry::RequestContext;
use tracing::{debug, warn, Instrument as _};

use crate::bindings::ServiceBindings;
use crate::registry::ServiceRegistry;

/// One content block of a `tools/call` result (§6 wire protocol).
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContent {
    /// Plain text, typically a JSON-encoded value.
    Text(String),
    /// Base64-encoded image bytes with their MIME type.
    Image {
        /// Base64-encoded bytes.
        data: String,
        /// MIME type, e.g. `image/jpeg`.
        mime_type: String,
    },
    /// Base64-encoded audio bytes with their MIME type.
    Audio {
        /// Base64-encoded bytes.
        data: String,
        /// MIME type, e.g. `audio/mpeg`.
        mime_type: String,
    },
}

/// The result of a `tools/call`, always a protocol-level success — tool
/// failures are carried in `is_error`, per the "Result-as-data for tool
/// errors" design note.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Content blocks to return to the client.
    pub content: Vec<ToolContent>,
    /// Whether this call represents a tool-level failure.
    pub is_error: bool,
}

impl DispatchOutcome {
    fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text(text.into())],
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text(message.into())],
            is_error: true,
        }
    }

    fn blob(mime_type: String, bytes: Vec<u8>) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let content = if mime_type.starts_with("image/") {
            ToolContent::Image { data, mime_type }
        } else if mime_type.starts_with("audio/") {
            ToolContent::Audio { data, mime_type }
        } else {
            // Non-audio/image blobs have no dedicated content block in the
            // wire protocol; fall back to a text description rather than
            // inventing an untyped binary block.
            ToolContent::Text(format!("<binary {mime_type} content, {} bytes>", data.len()))
        };
        Self {
            content: vec![content],
            is_error: false,
        }
    }
}

/// Whether `token` may see/call a tool with this `read_only_hint`, on a
/// service it holds `permission` for.
fn permits(permission: Permission, read_only_hint: bool) -> bool {
    permission.permits(read_only_hint)
}

/// Ties a [`ServiceRegistry`] to a [`ServiceBindings`] snapshot and exposes
/// the permission-gated `ListTools`/`CallTool` surface a session needs.
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    bindings: ServiceBindings,
}

impl Dispatcher {
    /// Build a dispatcher over a fixed registry and a live bindings handle.
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>, bindings: ServiceBindings) -> Self {
        Self { registry, bindings }
    }

    /// List every tool visible to `token`: service globally enabled, and
    /// permitted by the token's permission for that service (§4.F step
    /// preceding `CallTool`). Returns nothing if the server is disabled.
    #[must_use]
    pub fn list_tools(&self, token: &Token) -> Vec<Tool> {
        let bindings = self.bindings.current();
        if !bindings.server_enabled() {
            return Vec::new();
        }
        self.registry
            .all_tools()
            .into_iter()
            .filter(|(service_id, tool)| {
                bindings.service_enabled(service_id)
                    && permits(
                        token.permission_for(service_id),
                        tool.annotations.read_only_hint,
                    )
            })
            .map(|(_, tool)| tool.clone())
            .collect()
    }

    /// Invoke a tool by name on behalf of `token`, re-checking enablement
    /// and permission before dispatch (§4.F steps 1-6).
    pub async fn call_tool(
        &self,
        token: &Token,
        name: &ToolName,
        args: serde_json::Value,
    ) -> DispatchOutcome {
        let context = RequestContext::new("dispatcher").with_operation(name.as_str());
        self.call_tool_inner(token, name, args).instrument(context.span()).await
    }

    async fn call_tool_inner(
        &self,
        token: &Token,
        name: &ToolName,
        args: serde_json::Value,
    ) -> DispatchOutcome {
        let bindings = self.bindings.current();
        if !bindings.server_enabled() {
            return DispatchOutcome::error("server is disabled");
        }

        let Some(service) = self.registry.resolve(name) else {
            return DispatchOutcome::error(format!(
                "tool not found or service not enabled: {name}"
            ));
        };

        let service_id = service.id();
        let read_only_hint = service
            .tools()
            .iter()
            .find(|t| &t.name == name)
            .map(|t| t.annotations.read_only_hint)
            .unwrap_or(false);

        if !bindings.service_enabled(&service_id)
            || !permits(token.permission_for(&service_id), read_only_hint)
        {
            return DispatchOutcome::error(format!("permission denied for '{name}'"));
        }

        debug!(tool = %name, service = %service_id, "dispatching tool call");

        match service.call(name.as_str(), args).await {
            Ok(ServiceOutcome::Value(value)) => match serde_json::to_string(&value) {
                Ok(text) => DispatchOutcome::text(text),
                Err(err) => DispatchOutcome::error(format!("serialization error: {err}")),
            },
            Ok(ServiceOutcome::Blob(blob)) => DispatchOutcome::blob(blob.mime_type, blob.bytes),
            Ok(ServiceOutcome::NotHandled) => {
                // Unreachable via the precomputed ToolName -> ServiceId
                // map in the normal case; see SPEC_FULL.md Open Questions.
                warn!(tool = %name, "service declined a tool routed to it");
                DispatchOutcome::error(format!(
                    "tool not found or service not enabled: {name}"
                ))
            },
            Err(err) => DispatchOutcome::error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use imcp_core::{Secret, TokenId};

    use super::*;
    use crate::bindings::BindingsSnapshot;
    use crate::catalog::CalendarService;
    use crate::service::Service;

    fn token_with(service: &str, permission: Permission) -> Token {
        let mut permissions = HashMap::new();
        permissions.insert(imcp_core::ServiceId::new(service), permission);
        Token {
            id: TokenId::new(),
            name: "test".to_string(),
            secret: Secret::generate(),
            created_at: Utc::now(),
            permissions,
        }
    }

    fn dispatcher_with_calendar_enabled() -> Dispatcher {
        let calendar: Arc<dyn Service> = Arc::new(CalendarService::new());
        let registry = Arc::new(ServiceRegistry::new(vec![calendar]));
        let mut enabled = HashMap::new();
        enabled.insert(imcp_core::ServiceId::new("CalendarService"), true);
        let bindings = ServiceBindings::new(BindingsSnapshot::new(true, enabled));
        Dispatcher::new(registry, bindings)
    }

    #[test]
    fn list_tools_filters_by_read_only_permission() {
        let dispatcher = dispatcher_with_calendar_enabled();
        let token = token_with("CalendarService", Permission::ReadOnly);
        let tools = dispatcher.list_tools(&token);
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str().to_string()).collect();
        assert!(names.contains(&"calendar_read".to_string()));
        assert!(!names.contains(&"calendar_create".to_string()));
    }

    #[test]
    fn list_tools_empty_when_server_disabled() {
        let calendar: Arc<dyn Service> = Arc::new(CalendarService::new());
        let registry = Arc::new(ServiceRegistry::new(vec![calendar]));
        let mut enabled = HashMap::new();
        enabled.insert(imcp_core::ServiceId::new("CalendarService"), true);
        let bindings = ServiceBindings::new(BindingsSnapshot::new(false, enabled));
        let dispatcher = Dispatcher::new(registry, bindings);

        let token = token_with("CalendarService", Permission::Full);
        assert!(dispatcher.list_tools(&token).is_empty());
    }

    #[tokio::test]
    async fn call_tool_denies_readonly_on_write_tool() {
        let dispatcher = dispatcher_with_calendar_enabled();
        let token = token_with("CalendarService", Permission::ReadOnly);
        let outcome = dispatcher
            .call_tool(&token, &ToolName::new("calendar_create"), serde_json::json!({}))
            .await;
        assert!(outcome.is_error);
        assert_eq!(
            outcome.content,
            vec![ToolContent::Text(
                "permission denied for 'calendar_create'".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn call_tool_not_found_for_unknown_name() {
        let dispatcher = dispatcher_with_calendar_enabled();
        let token = token_with("CalendarService", Permission::Full);
        let outcome = dispatcher
            .call_tool(&token, &ToolName::new("nonexistent"), serde_json::json!({}))
            .await;
        assert!(outcome.is_error);
    }

    #[tokio::test]
    async fn call_tool_succeeds_with_full_permission() {
        let dispatcher = dispatcher_with_calendar_enabled();
        let token = token_with("CalendarService", Permission::Full);
        let outcome = dispatcher
            .call_tool(&token, &ToolName::new("calendar_read"), serde_json::json!({}))
            .await;
        assert!(!outcome.is_error);
    }
}
