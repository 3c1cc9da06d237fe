//! Shared harness for end-to-end scenario tests (spec §8).
//!
//! Spins up a real [`DaemonState`] with its Listener bound to an OS-assigned
//! loopback port behind a `tempfile`-backed Port File, then speaks the wire
//! protocol directly over a raw [`TcpStream`]: a newline-terminated token
//! preamble followed by newline-delimited JSON-RPC, the same shape
//! `mcp_bridge_e2e.rs`'s `RawBridge` exercises against a subprocess.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use imcp_core::{Permission, ServiceId, Token, TokenId};
use imcp_daemon::DaemonState;
use imcp_services::{BindingsSnapshot, Service, ServiceBindings};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// How long a single scenario test will wait for a response or
/// notification before failing.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to poll the Port File for before giving up.
const PORT_FILE_BUDGET: Duration = Duration::from_secs(5);

/// An in-process daemon, listening on loopback, torn down on drop.
pub struct Harness {
    pub state: DaemonState,
    pub port: u16,
    _port_dir: TempDir,
}

impl Harness {
    /// Start a daemon over the given services with the given per-service
    /// enabled map (server itself always enabled).
    pub async fn start(services: Vec<Arc<dyn Service>>, service_enabled: HashMap<ServiceId, bool>) -> Self {
        let port_dir = TempDir::new().expect("create temp dir for port file");
        let port_file_path = port_dir.path().join("server.port");

        let bindings = ServiceBindings::new(BindingsSnapshot::new(true, service_enabled));
        let mut state = DaemonState::new(services, bindings);
        let config = imcp_config::DaemonConfig::default();
        let _listener_handle = state.spawn_listener(port_file_path.clone(), &config);

        let port = wait_for_port_file(&port_file_path).await;
        Self {
            state,
            port,
            _port_dir: port_dir,
        }
    }

    /// Publish a single token as the entire token store.
    pub fn publish_token(&self, token: Token) {
        self.state.tokens.publish(vec![token]);
    }

    /// Replace the service-enabled bindings, keeping the server enabled.
    pub fn publish_bindings(&self, service_enabled: HashMap<ServiceId, bool>) {
        self.state.bindings.publish(BindingsSnapshot::new(true, service_enabled));
    }

    /// Open a fresh raw connection to the daemon's loopback port.
    pub async fn connect(&self) -> RawClient {
        let stream = TcpStream::connect(("127.0.0.1", self.port))
            .await
            .expect("connect to daemon loopback port");
        RawClient::new(stream)
    }
}

async fn wait_for_port_file(path: &std::path::Path) -> u16 {
    let deadline = tokio::time::Instant::now() + PORT_FILE_BUDGET;
    loop {
        if let Ok(contents) = std::fs::read_to_string(path) {
            if let Ok(port) = contents.trim().parse::<u16>() {
                return port;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("port file {} never appeared", path.display());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// A token fixture with the given permissions, secret fixed to all-zero hex
/// so tests can hand the same preamble to [`RawClient::send_preamble`].
pub fn fixture_token(name: &str, permissions: HashMap<ServiceId, Permission>) -> Token {
    Token {
        id: TokenId::new(),
        name: name.to_string(),
        secret: imcp_core::Secret::from_hex(&"ab".repeat(32)).expect("64-hex secret"),
        created_at: Utc::now(),
        permissions,
    }
}

/// The 64-lowercase-hex rendering [`fixture_token`] always uses.
pub fn fixture_secret_hex() -> String {
    "ab".repeat(32)
}

/// A raw newline-delimited JSON-RPC connection to the daemon, speaking the
/// wire protocol directly (token preamble, then JSON-RPC request/response
/// lines, interleaved with server-initiated notifications).
pub struct RawClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RawClient {
    fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer: write,
        }
    }

    /// Send the token preamble line. Call before any JSON-RPC traffic.
    pub async fn send_preamble(&mut self, token_hex: &str) {
        self.writer
            .write_all(format!("{token_hex}\n").as_bytes())
            .await
            .expect("write token preamble");
    }

    /// Send one JSON-RPC message.
    pub async fn send(&mut self, message: &Value) {
        let mut line = serde_json::to_string(message).expect("serialize JSON-RPC message");
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.expect("write JSON-RPC line");
    }

    /// Read the next line and parse it as JSON, regardless of whether it is
    /// a response or a notification.
    pub async fn recv_any(&mut self) -> Value {
        let mut line = String::new();
        tokio::time::timeout(RECV_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a message")
            .expect("read line from daemon");
        assert!(!line.is_empty(), "connection closed before a message arrived");
        serde_json::from_str(line.trim_end()).expect("parse JSON-RPC message")
    }

    /// Read lines, skipping any whose `method` is `notifications/...`,
    /// until the response with the given request id arrives.
    pub async fn recv_response(&mut self, id: i64) -> Value {
        loop {
            let value = self.recv_any().await;
            if value.get("id").and_then(Value::as_i64) == Some(id) {
                return value;
            }
        }
    }

    /// Read lines, skipping responses, until a notification with the given
    /// method arrives.
    pub async fn recv_notification(&mut self, method: &str) -> Value {
        loop {
            let value = self.recv_any().await;
            if value.get("method").and_then(Value::as_str) == Some(method) {
                return value;
            }
        }
    }

    /// Assert the connection is closed (EOF) without any bytes arriving.
    pub async fn assert_closed(&mut self) {
        let mut buf = [0u8; 1];
        use tokio::io::AsyncReadExt;
        let n = tokio::time::timeout(RECV_TIMEOUT, self.reader.read(&mut buf))
            .await
            .expect("timed out waiting for connection to close")
            .expect("read from closing connection");
        assert_eq!(n, 0, "expected EOF, got a byte");
    }

    /// Perform the MCP `initialize` + `notifications/initialized` handshake
    /// (the same shape `mcp_bridge_e2e.rs`'s `RawBridge::handshake` uses).
    pub async fn handshake(&mut self) {
        self.send(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-11-25",
                "capabilities": {},
                "clientInfo": { "name": "integration-test", "version": "0.0.1" }
            }
        }))
        .await;

        let resp = self.recv_response(0).await;
        assert!(resp["result"]["serverInfo"].is_object(), "missing serverInfo in initialize response");

        self.send(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .await;
    }

    /// Send `tools/list` and return the `result.tools` array.
    pub async fn list_tools(&mut self, id: i64) -> Vec<Value> {
        self.send(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/list",
            "params": {}
        }))
        .await;
        let resp = self.recv_response(id).await;
        resp["result"]["tools"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    /// Send `tools/call` and return the full response.
    pub async fn call_tool(&mut self, id: i64, name: &str, arguments: Value) -> Value {
        self.send(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }))
        .await;
        self.recv_response(id).await
    }
}
