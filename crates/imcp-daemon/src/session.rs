//! MCP Session: one accepted, authenticated connection driven through
//! rmcp's server protocol engine (§4.E).
//!
//! Built as a manual `ServerHandler`, not the `#[tool_router]` macro, since
//! the tool catalog is a runtime view over the [`Dispatcher`] rather than a
//! fixed set of methods known at compile time. `list_tools`/`call_tool`
//! never return a JSON-RPC protocol error: a disabled server, a denied
//! permission, or a failing tool all come back as an ordinary `CallTool`
//! result with `is_error` set, per the "Result-as-data for tool errors"
//! design note.

use std::sync::Arc;
use std::time::Duration;

use imcp_core::{SessionId, Token, ToolName};
use imcp_services::{Dispatcher, DispatchOutcome, ToolContent};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{NotificationContext, RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, Peer, ServerHandler};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{DaemonError, DaemonResult};

/// Time budget for the `initialize` handshake after a connection passes
/// the Auth Gate (§4.E: "a 10-second setup timeout").
const SETUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval of the idle liveness check once a session is running (§4.E:
/// "checks the transport every 30 seconds").
const LIVENESS_INTERVAL: Duration = Duration::from_secs(30);

fn tool_content_to_rmcp(content: ToolContent) -> Content {
    match content {
        ToolContent::Text(text) => Content::text(text),
        // rmcp's `Content` exposes per-kind constructors mirroring
        // `Content::text`; not exercised by the sample catalog's services,
        // which only ever return `ToolContent::Text`, so this path is
        // inferred from that naming convention rather than copied from a
        // concrete call site (see DESIGN.md).
        ToolContent::Image { data, mime_type } => Content::image(data, mime_type),
        ToolContent::Audio { data, mime_type } => Content::new(
            rmcp::model::RawContent::Audio(rmcp::model::RawAudioContent { data, mime_type }),
            None,
        ),
    }
}

fn dispatch_outcome_to_call_result(outcome: DispatchOutcome) -> CallToolResult {
    let content: Vec<Content> = outcome.content.into_iter().map(tool_content_to_rmcp).collect();
    if outcome.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// Whether a notification-send failure indicates the peer is gone, as
/// opposed to a transient error worth only logging (§4.E: "connection-reset
/// or not-connected class errors tear the session down; anything else is
/// logged and the session continues").
fn is_dead_peer(error: &rmcp::service::ServiceError) -> bool {
    let message = error.to_string().to_ascii_lowercase();
    message.contains("reset") || message.contains("not connected") || message.contains("closed") || message.contains("broken pipe")
}

/// The handler rmcp drives for one accepted connection. Holds the
/// [`Token`] the Auth Gate admitted this connection with for the rest of
/// its lifetime, even if the Token Store is republished mid-session
/// (§4.C).
struct Session {
    id: SessionId,
    token: Token,
    dispatcher: Arc<Dispatcher>,
    peer: Arc<Mutex<Option<Peer<RoleServer>>>>,
}

impl ServerHandler for Session {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "imcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            instructions: Some(
                "Exposes host calendar, contacts, messages, and reminders as MCP tools, gated by the token this connection authenticated with.".into(),
            ),
            ..Default::default()
        }
    }

    /// Capture the client-declared name from the `initialize` request and
    /// log it once per session (§3 Data Model — Session; resolved Open
    /// Question: logged for operators, never consulted for permission
    /// decisions, which stay keyed on `self.token` alone).
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        info!(
            session_id = %self.id,
            client_name = %request.client_info.name,
            client_version = %request.client_info.version,
            "mcp session initialized"
        );
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .dispatcher
            .list_tools(&self.token)
            .into_iter()
            .map(|tool| {
                let schema = tool.input_schema.as_object().cloned().unwrap_or_default();
                let mut rmcp_tool = rmcp::model::Tool::new(tool.name.as_str().to_string(), tool.description, schema);
                rmcp_tool.annotations = Some(rmcp::model::ToolAnnotations {
                    read_only_hint: Some(tool.annotations.read_only_hint),
                    ..Default::default()
                });
                rmcp_tool
            })
            .collect();

        Ok(ListToolsResult {
            meta: None,
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = ToolName::new(request.name.as_ref());
        let arguments = serde_json::Value::Object(request.arguments.clone().unwrap_or_default());
        let outcome = self.dispatcher.call_tool(&self.token, &name, arguments).await;
        Ok(dispatch_outcome_to_call_result(outcome))
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            meta: None,
            prompts: Vec::new(),
            next_cursor: None,
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            meta: None,
            resources: Vec::new(),
            next_cursor: None,
        })
    }

    async fn on_initialized(&self, context: NotificationContext<RoleServer>) {
        *self.peer.lock().await = Some(context.peer.clone());
    }
}

/// Drive one authenticated connection through rmcp's protocol engine until
/// it closes, the setup handshake times out, or `cancel` fires.
///
/// # Errors
///
/// Returns [`DaemonError::Session`] if the `initialize` handshake does not
/// complete within [`SETUP_TIMEOUT`] or rmcp's transport setup fails.
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    token: Token,
    dispatcher: Arc<Dispatcher>,
    mut changes: broadcast::Receiver<()>,
    cancel: CancellationToken,
) -> DaemonResult<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let peer: Arc<Mutex<Option<Peer<RoleServer>>>> = Arc::new(Mutex::new(None));
    let handler = Session {
        id: SessionId::new(),
        token,
        dispatcher,
        peer: peer.clone(),
    };

    let service = tokio::time::timeout(SETUP_TIMEOUT, rmcp::serve_server(handler, (reader, writer)))
        .await
        .map_err(|_| DaemonError::Session("initialize handshake timed out".to_string()))?
        .map_err(|err| DaemonError::Session(err.to_string()))?;

    let waiting = service.waiting();
    tokio::pin!(waiting);

    let mut liveness = tokio::time::interval(LIVENESS_INTERVAL);
    liveness.tick().await;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("mcp session cancelled");
                break;
            }

            result = &mut waiting => {
                if let Err(err) = result {
                    warn!(error = %err, "mcp session ended with an error");
                }
                break;
            }

            change = changes.recv() => {
                match change {
                    Ok(()) => {
                        let maybe_peer = peer.lock().await.clone();
                        if let Some(peer) = maybe_peer {
                            if let Err(err) = peer.notify_tool_list_changed().await {
                                if is_dead_peer(&err) {
                                    debug!(error = %err, "peer gone while notifying of tool list change");
                                    break;
                                }
                                warn!(error = %err, "failed to notify peer of tool list change");
                            }
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {},
                }
            }

            _ = liveness.tick() => {
                debug!("mcp session liveness check");
            }
        }
    }

    Ok(())
}
