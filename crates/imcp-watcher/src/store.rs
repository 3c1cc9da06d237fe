//! The row-id source the watcher polls.
//!
//! A trait, not a concrete SQLite connection, so the watcher's trigger
//! logic can run against an in-memory test double instead of a real
//! database file (§10.6: "against a pluggable `MessageStore` trait").

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::WatcherResult;

/// Source of the "highest incoming message row id" the watcher tracks.
pub trait MessageStore: Send + Sync {
    /// The current `MAX(ROWID)` among messages not sent by the local user.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    fn max_row_id(&self) -> WatcherResult<i64>;
}

/// Queries a real SQLite-shaped message database (§4.I: `MAX(ROWID) FROM
/// message WHERE is_from_me = 0`).
pub struct SqliteMessageStore {
    connection: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteMessageStore {
    /// Open a read-only connection to the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::WatcherError::Database`] if the file cannot
    /// be opened.
    pub fn open(path: &Path) -> WatcherResult<Self> {
        let connection = rusqlite::Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        )?;
        Ok(Self {
            connection: std::sync::Mutex::new(connection),
        })
    }
}

impl MessageStore for SqliteMessageStore {
    fn max_row_id(&self) -> WatcherResult<i64> {
        let row_id: Option<i64> = self
            .connection
            .lock()
            .expect("sqlite connection mutex poisoned")
            .query_row(
                "SELECT MAX(ROWID) FROM message WHERE is_from_me = 0",
                [],
                |row| row.get(0),
            )?;
        Ok(row_id.unwrap_or(0))
    }
}

/// An in-memory row-id counter, for tests and for simulating a database's
/// growth without a real SQLite file.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    row_id: AtomicI64,
}

impl InMemoryMessageStore {
    /// Start the store at the given row id.
    #[must_use]
    pub fn new(initial: i64) -> Self {
        Self {
            row_id: AtomicI64::new(initial),
        }
    }

    /// Advance the row id, simulating newly arrived messages.
    pub fn advance_to(&self, row_id: i64) {
        self.row_id.store(row_id, Ordering::SeqCst);
    }
}

impl MessageStore for InMemoryMessageStore {
    fn max_row_id(&self) -> WatcherResult<i64> {
        Ok(self.row_id.load(Ordering::SeqCst))
    }
}
