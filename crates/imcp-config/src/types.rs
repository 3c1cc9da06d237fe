//! Daemon configuration shape (§10.4).
//!
//! Deliberately excludes tokens and permissions — per §4.C those arrive
//! over the out-of-process trust boundary, never from this file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_bind_retry_delay_ms() -> u64 {
    1500
}

fn default_listener_supervisor_interval_secs() -> u64 {
    10
}

fn default_watcher_script_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Output format for structured logs, matching `LogConfig::with_format`
/// (§10.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line, color-coded when attached to a tty.
    #[default]
    Pretty,
    /// Human-readable, single-line.
    Compact,
    /// Newline-delimited JSON, for log aggregation.
    Json,
}

/// Non-secret daemon settings (§4.A Listener retry timing, §4.I Watcher
/// script, §10.3 logging). Loaded from an optional TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    /// Delay before the Listener retries binding after `AddrInUse` or a
    /// failed/cancelled state (§4.B: "1-2 seconds").
    #[serde(default = "default_bind_retry_delay_ms")]
    pub bind_retry_delay_ms: u64,

    /// Interval of the supervisor loop that force-restarts a Listener
    /// stuck outside `ready` (§4.B: "every 10 seconds").
    #[serde(default = "default_listener_supervisor_interval_secs")]
    pub listener_supervisor_interval_secs: u64,

    /// Path to the external script the Message Watcher invokes on new
    /// messages (§4.I, §6 Watcher script contract). `None` disables the
    /// watcher entirely.
    #[serde(default)]
    pub watcher_script_path: Option<PathBuf>,

    /// Timeout the Watcher enforces on the script process (§4.I: "30
    /// second timeout").
    #[serde(default = "default_watcher_script_timeout_secs")]
    pub watcher_script_timeout_secs: u64,

    /// `tracing` level filter directive, e.g. `"info"` or
    /// `"imcp_daemon=debug,info"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Structured log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_retry_delay_ms: default_bind_retry_delay_ms(),
            listener_supervisor_interval_secs: default_listener_supervisor_interval_secs(),
            watcher_script_path: None,
            watcher_script_timeout_secs: default_watcher_script_timeout_secs(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_timings() {
        let config = DaemonConfig::default();
        assert_eq!(config.bind_retry_delay_ms, 1500);
        assert_eq!(config.listener_supervisor_interval_secs, 10);
        assert_eq!(config.watcher_script_timeout_secs, 30);
        assert!(config.watcher_script_path.is_none());
    }

    #[test]
    fn partial_toml_fills_in_remaining_defaults() {
        let parsed: DaemonConfig = toml::from_str("logLevel = \"debug\"\n").unwrap();
        assert_eq!(parsed.log_level, "debug");
        assert_eq!(parsed.bind_retry_delay_ms, 1500);
    }
}
