//! `imcp-server`: the stdio<->TCP bridge binary (§6 Bridge CLI).

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use imcp_bridge::{log_session_outcome, run_session, wait_for_port, SessionOutcome, DEFAULT_BUDGET};
use imcp_telemetry::{setup_logging, LogConfig, LogFormat};
use tokio::net::TcpStream;
use tracing::{error, info, warn};

/// Brief delay before reconnecting after a network-timeout class failure
/// (§4.H Retry policy).
const TIMEOUT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Delay before retrying after an unclassified error (§4.H Retry policy:
/// "retry after 5 seconds up to process exit").
const FAILURE_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "imcp-server", about = "Stdio<->TCP bridge to the iMCP daemon")]
struct Cli {
    /// The 64-lowercase-hex token sent as the preamble on every
    /// connection (§6: "Bridge CLI: imcp-server --token <64-hex>").
    #[arg(long)]
    token: String,

    /// Override the default port rendezvous file path.
    #[arg(long)]
    port_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs only ever go to stderr (the default target): stdout is the
    // JSON-RPC channel (§6: "stderr carries logs only").
    let _ = setup_logging(&LogConfig::new("info").with_format(LogFormat::Compact));

    let port_file_path = match cli.port_file {
        Some(path) => path,
        None => match imcp_config::default_port_file_path() {
            Ok(path) => path,
            Err(err) => {
                error!(error = %err, "failed to resolve default port file path");
                std::process::exit(1);
            },
        },
    };

    std::process::exit(run(port_file_path, cli.token).await);
}

async fn run(port_file_path: PathBuf, token: String) -> i32 {
    loop {
        let port = match wait_for_port(&port_file_path, DEFAULT_BUDGET).await {
            Ok(port) => port,
            Err(err) => {
                error!(error = %err, "giving up waiting for the server's port file");
                return 1;
            },
        };

        let stream = match TcpStream::connect(("127.0.0.1", port)).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, port, "failed to connect to server, retrying");
                tokio::time::sleep(FAILURE_RETRY_DELAY).await;
                continue;
            },
        };

        info!(port, "connected to server");
        let outcome = run_session(tokio::io::stdin(), tokio::io::stdout(), stream, &token).await;
        log_session_outcome(&outcome);

        match outcome {
            SessionOutcome::CleanClose => return 0,
            SessionOutcome::RemoteLost => return 1,
            SessionOutcome::Timeout => tokio::time::sleep(TIMEOUT_RETRY_DELAY).await,
            SessionOutcome::Failed(_) => tokio::time::sleep(FAILURE_RETRY_DELAY).await,
        }
    }
}
