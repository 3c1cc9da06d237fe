//! Well-known filesystem locations shared by the config loader and the
//! daemon's Port File (§4.A, §6 Port rendezvous file).
//!
//! Kept here rather than in `imcp-daemon` so the config loader's default
//! search path ("beside the port file", §10.4) doesn't need a dependency
//! on the daemon crate.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{ConfigError, ConfigResult};

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("", "", "iMCP").ok_or(ConfigError::NoDefaultDirectory)
}

/// The directory both the port file and the default config file live in.
///
/// # Errors
///
/// Returns [`ConfigError::NoDefaultDirectory`] if the platform has no
/// resolvable home directory.
pub fn support_dir() -> ConfigResult<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Default path of the port rendezvous file: `<support_dir>/server.port`.
///
/// # Errors
///
/// Returns [`ConfigError::NoDefaultDirectory`] if the platform has no
/// resolvable home directory.
pub fn default_port_file_path() -> ConfigResult<PathBuf> {
    Ok(support_dir()?.join("server.port"))
}

/// Default path of the daemon config file: `<support_dir>/config.toml`.
///
/// # Errors
///
/// Returns [`ConfigError::NoDefaultDirectory`] if the platform has no
/// resolvable home directory.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    Ok(support_dir()?.join("config.toml"))
}
