//! Config file loading, following the same open-check-permissions-parse
//! sequence as `astrid-kernel`'s `Secrets::load`.

use std::path::Path;

#[cfg(not(unix))]
use tracing::warn;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::DaemonConfig;

/// Load the daemon config from `path`, or fall back to
/// [`DaemonConfig::default`] if `path` is `None` and the default search
/// path (§10.4: beside the port file) has no file either.
///
/// # Errors
///
/// Returns [`ConfigError::InsecurePermissions`] if the file exists and is
/// readable by anyone other than its owner on Unix, or
/// [`ConfigError::Parse`] if it is not valid TOML matching
/// [`DaemonConfig`]'s shape.
pub fn load(path: Option<&Path>) -> ConfigResult<DaemonConfig> {
    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => crate::paths::default_config_path()?,
    };

    if !resolved.exists() {
        debug!(path = %resolved.display(), "no config file present, using defaults");
        return Ok(DaemonConfig::default());
    }

    load_file(&resolved)
}

/// Load and parse a specific config file, enforcing the 0600 permission
/// check unconditionally (unlike [`load`], which tolerates a missing
/// default file).
///
/// # Errors
///
/// Returns [`ConfigError::Io`], [`ConfigError::InsecurePermissions`], or
/// [`ConfigError::Parse`].
pub fn load_file(path: &Path) -> ConfigResult<DaemonConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    check_permissions(path)?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> ConfigResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions {
            path: path.to_path_buf(),
            mode: mode & 0o777,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(path: &Path) -> ConfigResult<()> {
    warn!(path = %path.display(), "permission check skipped: not a Unix platform");
    Ok(())
}
