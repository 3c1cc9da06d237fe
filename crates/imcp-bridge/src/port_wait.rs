//! Polls the Port File rendezvous point until the daemon publishes a port
//! or the budget expires (§4.A "Readers poll with exponential or fixed
//! short backoff up to a bounded timeout (30s default)"; §4.H Startup).

use std::path::Path;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};

/// Default polling budget before giving up on the port file (§4.A: "30s
/// default").
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(30);

/// Fixed interval between polls.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll `path` for a readable, parseable port number until it appears or
/// `budget` elapses.
///
/// # Errors
///
/// Returns [`BridgeError::PortFileTimeout`] if no valid port file appears
/// within `budget`, or [`BridgeError::MalformedPortFile`] if the file's
/// contents are not a decimal port number once read.
pub async fn wait_for_port(path: &Path, budget: Duration) -> BridgeResult<u16> {
    let deadline = Instant::now() + budget;
    loop {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return trimmed
                        .parse::<u16>()
                        .map_err(|source| BridgeError::MalformedPortFile {
                            path: path.to_path_buf(),
                            source,
                        });
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => debug!(path = %path.display(), error = %err, "transient error reading port file, retrying"),
        }

        if Instant::now() >= deadline {
            return Err(BridgeError::PortFileTimeout {
                path: path.to_path_buf(),
                budget_secs: budget.as_secs(),
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_port_once_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.port");
        std::fs::write(&path, "54321").unwrap();

        let port = wait_for_port(&path, Duration::from_secs(1)).await.unwrap();
        assert_eq!(port, 54321);
    }

    #[tokio::test]
    async fn picks_up_a_port_file_written_after_polling_starts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.port");

        let write_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            std::fs::write(&write_path, "9999").unwrap();
        });

        let port = wait_for_port(&path, Duration::from_secs(2)).await.unwrap();
        assert_eq!(port, 9999);
    }

    #[tokio::test]
    async fn times_out_when_file_never_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.port");

        let err = wait_for_port(&path, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, BridgeError::PortFileTimeout { .. }));
    }

    #[tokio::test]
    async fn rejects_malformed_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.port");
        std::fs::write(&path, "not-a-port").unwrap();

        let err = wait_for_port(&path, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, BridgeError::MalformedPortFile { .. }));
    }
}
