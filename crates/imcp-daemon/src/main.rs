//! `imcpd`: the process hosting the Listener, Token Store, and service
//! catalog described in `imcp_daemon`.

#![deny(unsafe_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use imcp_daemon::DaemonState;
use imcp_services::catalog::{CalendarService, ContactsService, MessagesService, RemindersService};
use imcp_services::{BindingsSnapshot, Service, ServiceBindings};
use imcp_telemetry::{LogConfig, LogFormat as TelemetryLogFormat, setup_logging};
use imcp_watcher::MessageWatcher;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "imcpd", about = "Localhost MCP server exposing host capabilities")]
struct Cli {
    /// Path to the daemon config file. Defaults to the platform support
    /// directory's `config.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the port rendezvous file. Defaults to the platform support
    /// directory's `server.port`.
    #[arg(long)]
    port_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = imcp_config::load(cli.config.as_deref()).context("failed to load daemon config")?;

    setup_logging(
        &LogConfig::new(config.log_level.clone()).with_format(match config.log_format {
            imcp_config::LogFormat::Pretty => TelemetryLogFormat::Pretty,
            imcp_config::LogFormat::Compact => TelemetryLogFormat::Compact,
            imcp_config::LogFormat::Json => TelemetryLogFormat::Json,
        }),
    )
    .context("failed to install logging")?;

    let port_file_path = match cli.port_file {
        Some(path) => path,
        None => imcp_config::default_port_file_path().context("failed to resolve default port file path")?,
    };

    let services: Vec<Arc<dyn Service>> = vec![
        Arc::new(CalendarService::new()),
        Arc::new(ContactsService::new()),
        Arc::new(MessagesService::new()),
        Arc::new(RemindersService::new()),
    ];

    let mut enabled = HashMap::new();
    for service in &services {
        enabled.insert(service.id(), true);
    }
    let bindings = ServiceBindings::new(BindingsSnapshot::new(true, enabled));

    let mut state = DaemonState::new(services, bindings);
    let listener_handle = state.spawn_listener(port_file_path, &config);
    let cancel = state.cancellation_token();

    let watcher_handle = config.watcher_script_path.clone().map(|script_path| {
        let cancel = cancel.clone();
        let timeout = std::time::Duration::from_secs(config.watcher_script_timeout_secs);
        tokio::spawn(async move {
            match imcp_watcher::SqliteMessageStore::open(&db_path_for_watcher()) {
                Ok(store) => match MessageWatcher::new(db_path_for_watcher(), Box::new(store), Some(script_path)) {
                    Ok(watcher) => {
                        if let Err(err) = watcher.with_script_timeout(timeout).run(cancel).await {
                            tracing::error!(error = %err, "message watcher exited with an error");
                        }
                    },
                    Err(err) => tracing::error!(error = %err, "failed to start message watcher"),
                },
                Err(err) => tracing::error!(error = %err, "failed to open message database"),
            }
        })
    });

    info!("imcpd started");

    signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");

    state.shutdown();
    let _ = listener_handle.await;
    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }

    Ok(())
}

fn db_path_for_watcher() -> PathBuf {
    // Host-specific message database location; not resolved at build time
    // since it differs per platform (§4.I, §10.4 Open Questions).
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("Library/Messages/chat.db"))
        .unwrap_or_else(|| PathBuf::from("chat.db"))
}
