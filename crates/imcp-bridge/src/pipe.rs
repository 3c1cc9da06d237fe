//! The two duplex directions of the bridge (§4.H Stdin direction, Network
//! direction). Each is a standalone async loop generic over its reader and
//! writer so it can be driven against real stdio/TCP in `main.rs` or
//! against in-memory buffers in tests.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::framer::MessageFramer;
use crate::heartbeat::strip_heartbeat;

/// Read buffer size for the network-inbound direction (§4.H: "receive in
/// chunks up to a large bound (>= 1 MiB)").
const NETWORK_READ_BUF: usize = 1024 * 1024;

/// Read buffer size for stdin reads. Small relative to the network bound:
/// JSON-RPC requests from the client are short, and a smaller buffer keeps
/// the whitespace-accumulation loop responsive.
const STDIN_READ_BUF: usize = 8192;

/// Per-read timeout on the network direction, used only to detect "many
/// consecutive empty receives" (§4.H Retry policy: "unclassified network
/// timeouts ... trigger a reconnect"). A read succeeding with data resets
/// the counter; tokio's async read itself still blocks indefinitely on an
/// otherwise-healthy idle connection, since nothing here polls eagerly.
const NETWORK_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive network read timeouts before the direction gives up and
/// asks its caller to reconnect.
const CONSECUTIVE_TIMEOUT_THRESHOLD: u32 = 3;

fn is_all_whitespace(buf: &[u8]) -> bool {
    buf.iter().all(u8::is_ascii_whitespace)
}

async fn write_all_retrying<W>(writer: &mut W, mut bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while !bytes.is_empty() {
        let written = writer.write(bytes).await?;
        if written == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "write returned 0 bytes"));
        }
        bytes = &bytes[written..];
    }
    Ok(())
}

/// Outcome of a duplex direction's loop: why it stopped.
#[derive(Debug)]
pub enum DirectionOutcome {
    /// Clean EOF from the source side.
    Eof,
    /// Too many consecutive empty/timed-out reads on the network side.
    Timeout,
    /// An error that should propagate to the caller's retry policy.
    Error(BridgeError),
}

/// Pump bytes from `stdin` to `tcp_write`, accumulating whitespace-only
/// reads until non-whitespace content appears, then forwarding the
/// accumulation as a single write (§4.H Stdin direction).
pub async fn pump_stdin_to_tcp<R, W>(mut stdin: R, mut tcp_write: W) -> DirectionOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut accum = Vec::new();
    let mut buf = [0u8; STDIN_READ_BUF];
    loop {
        let read = match stdin.read(&mut buf).await {
            Ok(0) => return DirectionOutcome::Eof,
            Ok(n) => n,
            Err(err) => return DirectionOutcome::Error(BridgeError::StdinRead(err)),
        };
        accum.extend_from_slice(&buf[..read]);

        if is_all_whitespace(&accum) {
            continue;
        }

        if let Err(err) = write_all_retrying(&mut tcp_write, &accum).await {
            return DirectionOutcome::Error(BridgeError::TcpWrite(err));
        }
        accum.clear();
    }
}

/// Pump bytes from `tcp_read` to `stdout`, stripping heartbeat frames and
/// preserving newline message boundaries (§4.H Network direction).
pub async fn pump_tcp_to_stdout<R, W>(mut tcp_read: R, mut stdout: W) -> DirectionOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut framer = MessageFramer::new();
    let mut buf = vec![0u8; NETWORK_READ_BUF];
    let mut consecutive_timeouts = 0u32;

    loop {
        let read = match tokio::time::timeout(NETWORK_READ_TIMEOUT, tcp_read.read(&mut buf)).await {
            Ok(Ok(0)) => return DirectionOutcome::Eof,
            Ok(Ok(n)) => {
                consecutive_timeouts = 0;
                n
            },
            Ok(Err(err)) => return DirectionOutcome::Error(BridgeError::TcpRead(err)),
            Err(_elapsed) => {
                consecutive_timeouts += 1;
                debug!(consecutive_timeouts, "network read timed out");
                if consecutive_timeouts >= CONSECUTIVE_TIMEOUT_THRESHOLD {
                    return DirectionOutcome::Timeout;
                }
                continue;
            },
        };

        let stripped = strip_heartbeat(&buf[..read]);
        for message in framer.push(&stripped) {
            if let Err(err) = write_all_retrying(&mut stdout, &message).await {
                return DirectionOutcome::Error(BridgeError::StdoutWrite(err));
            }
        }
    }
}

/// Map a direction outcome into the bridge's retry policy.
///
/// # Errors
///
/// Returns the underlying [`BridgeError`] when the direction ended in an
/// error. `Eof`/`Timeout` are not errors: they signal clean close or a
/// caller-driven reconnect respectively.
pub fn log_outcome(direction: &str, outcome: &DirectionOutcome) {
    match outcome {
        DirectionOutcome::Eof => debug!(direction, "direction reached eof"),
        DirectionOutcome::Timeout => warn!(direction, "direction timed out repeatedly"),
        DirectionOutcome::Error(err) => warn!(direction, error = %err, "direction failed"),
    }
}
