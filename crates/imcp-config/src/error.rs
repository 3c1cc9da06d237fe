//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating, reading, or parsing the daemon config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be opened or read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML, or does not match the expected
    /// shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// The path that failed to parse.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The config file's Unix permission bits grant access beyond the
    /// owner, the same check `astrid-kernel`'s `Secrets::load` applies to
    /// its secrets file.
    #[error("config file {path} has insecure permissions {mode:o}, should be 0600")]
    InsecurePermissions {
        /// The path with the offending permissions.
        path: PathBuf,
        /// The permission bits actually observed.
        mode: u32,
    },

    /// No home/support directory could be determined for the default
    /// config path.
    #[error("could not determine a default config directory for this platform")]
    NoDefaultDirectory,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
