//! Structured logging setup: a small builder over `tracing-subscriber`.

use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

use crate::error::{TelemetryError, TelemetryResult};

/// Output format for the process's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line, color-coded when attached to a tty.
    #[default]
    Pretty,
    /// Human-readable, single-line.
    Compact,
    /// Newline-delimited JSON, for log aggregation.
    Json,
}

/// Where log output is written.
#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    /// The process's stderr, so stdout stays clear for protocol traffic
    /// (load-bearing for `imcp-bridge`, whose stdout is the JSON-RPC
    /// channel — see §6 Bridge CLI: "stderr carries logs only").
    #[default]
    Stderr,
    /// A rolling file under the given directory, via `tracing-appender`.
    File(PathBuf),
}

/// Logging configuration, built up fluently and passed to
/// [`setup_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: String,
    format: LogFormat,
    target: LogTarget,
    directive: Option<String>,
}

impl LogConfig {
    /// Start a config at the given base level (e.g. `"info"`, `"debug"`).
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            directive: None,
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Send output to a file under `dir` instead of stderr.
    #[must_use]
    pub fn with_file_target(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target = LogTarget::File(dir.into());
        self
    }

    /// Add an extra `RUST_LOG`-style directive on top of the base level,
    /// e.g. `"imcp_daemon=trace"`.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::InvalidDirective(e.to_string()))?;
        if let Some(directive) = &self.directive {
            filter = filter
                .add_directive(directive.parse().map_err(|_| {
                    TelemetryError::InvalidDirective(directive.clone())
                })?);
        }
        Ok(filter)
    }
}

/// Install a process-wide `tracing` subscriber built from `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidDirective`] if `config`'s level or
/// extra directive doesn't parse, [`TelemetryError::IoError`] if a file
/// target cannot be opened, or [`TelemetryError::AlreadyInitialized`] if a
/// global subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match (&config.target, config.format) {
        (LogTarget::Stderr, LogFormat::Pretty) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
        (LogTarget::Stderr, LogFormat::Compact) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).compact())
            .try_init(),
        (LogTarget::Stderr, LogFormat::Json) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json())
            .try_init(),
        (LogTarget::File(dir), format) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "imcp.log");
            let layer = tracing_subscriber::fmt::layer().with_writer(appender).with_ansi(false);
            match format {
                LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                LogFormat::Compact => registry.with(layer.compact()).try_init(),
                LogFormat::Json => registry.with(layer.json()).try_init(),
            }
        },
    };

    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

/// Install logging with sane defaults: `info` level, pretty format, stderr.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::new("info"))
}
