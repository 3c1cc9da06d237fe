//! Errors raised by the Message Watcher.

use thiserror::Error;

/// Errors the watcher can encounter. Most are logged and the watcher keeps
/// running (§4.I: "Watcher query/script errors (log, continue)"); only
/// construction failures (bad database path, unsupported filesystem watch)
/// are propagated to the caller.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The database file could not be opened.
    #[error("failed to open message database: {0}")]
    Database(#[from] rusqlite::Error),

    /// The filesystem watcher could not be installed on the database path.
    #[error("failed to watch message database: {0}")]
    Notify(#[from] notify::Error),

    /// The configured script path does not exist or is not executable.
    #[error("watcher script is not runnable: {0}")]
    ScriptNotRunnable(String),

    /// An IO error occurred spawning or waiting on the script process.
    #[error("watcher script IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for watcher operations.
pub type WatcherResult<T> = Result<T, WatcherError>;
