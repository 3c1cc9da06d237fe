//! Port File: the rendezvous point bridge processes poll for the
//! Listener's chosen ephemeral port (§4.A).
//!
//! Single-writer, single-reader-per-process: the Listener's `ready`
//! handler is the only writer, matching the "shared resources" note in §5.
//! Written the way `Secrets::load` reads its 0600 file, run in reverse —
//! create the directory 0700, write the file, then tighten it to 0600.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DaemonError, DaemonResult};

/// Write `port` into the file at `path`, creating its parent directory
/// with owner-only permissions if necessary. Writes to a sibling temp file
/// first and renames into place so readers never observe a partial write.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write(path: &Path, port: u16) -> DaemonResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| DaemonError::PortDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    set_owner_only_dir(dir)?;

    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, port.to_string()).map_err(|source| DaemonError::PortFileWrite {
        path: tmp_path.clone(),
        source,
    })?;
    set_owner_only_file(&tmp_path)?;

    std::fs::rename(&tmp_path, path).map_err(|source| DaemonError::PortFileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), port, "wrote port file");
    Ok(())
}

/// Remove the port file, ignoring a missing file (§4.B: "deleted on stop
/// and before restart").
pub fn remove(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed port file"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove port file"),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(unix)]
fn set_owner_only_dir(dir: &Path) -> DaemonResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).map_err(|source| {
        DaemonError::PortDirectory {
            path: dir.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_owner_only_dir(_dir: &Path) -> DaemonResult<()> {
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_file(path: &Path) -> DaemonResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|source| {
        DaemonError::PortFileWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn set_owner_only_file(_path: &Path) -> DaemonResult<()> {
    Ok(())
}
