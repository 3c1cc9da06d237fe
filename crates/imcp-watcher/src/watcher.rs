//! The Message Watcher's event loop (§4.I).
//!
//! Structured like `astrid-capsule`'s `CapsuleWatcher`: a `notify` callback
//! feeds raw filesystem events into an unbounded channel, a single pending
//! debounce deadline coalesces bursts, and a `tokio::select!` loop races
//! that deadline against a polling-fallback timer and cancellation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::WatcherResult;
use crate::store::MessageStore;
use crate::trigger::run_script;

/// File-event debounce window (§4.I: "debounced by 5 seconds").
pub const DEBOUNCE: Duration = Duration::from_secs(5);

/// Polling-fallback interval (§4.I: "a 60-second polling timer").
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Script execution timeout (§4.I, §6: "terminated at 30 s").
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

fn wal_sidecar_path(db_path: &Path) -> PathBuf {
    let mut name = db_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("-wal");
    db_path.with_file_name(name)
}

/// Watches a message database for new incoming rows and triggers an
/// external script on growth.
pub struct MessageWatcher {
    store: Box<dyn MessageStore>,
    hwm: i64,
    db_path: PathBuf,
    script_path: Option<PathBuf>,
    script_timeout: Duration,
}

impl MessageWatcher {
    /// Start a watcher against `db_path`, initializing the high-water mark
    /// from `store`'s current `MAX(ROWID)` (§4.I: "On start, queries ...
    /// and stores it as the high-water mark").
    ///
    /// # Errors
    ///
    /// Returns an error if the initial row-id query fails.
    pub fn new(
        db_path: PathBuf,
        store: Box<dyn MessageStore>,
        script_path: Option<PathBuf>,
    ) -> WatcherResult<Self> {
        let hwm = store.max_row_id()?;
        Ok(Self {
            store,
            hwm,
            db_path,
            script_path,
            script_timeout: SCRIPT_TIMEOUT,
        })
    }

    /// Override the default 30-second script timeout (tests use a shorter
    /// one).
    #[must_use]
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// The current high-water mark.
    #[must_use]
    pub fn high_water_mark(&self) -> i64 {
        self.hwm
    }

    /// Run the watch loop until `cancel` fires. Never returns an error:
    /// per §4.I, watcher query/script errors are logged and the loop
    /// continues; only the initial filesystem-watch setup can fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem watcher cannot be installed on
    /// the database path.
    pub async fn run(mut self, cancel: CancellationToken) -> WatcherResult<()> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel();
        let mut fs_watcher = RecommendedWatcher::new(
            move |res| {
                let _ = raw_tx.send(res);
            },
            notify::Config::default(),
        )?;

        fs_watcher.watch(&self.db_path, RecursiveMode::NonRecursive)?;
        let wal_path = wal_sidecar_path(&self.db_path);
        if wal_path.exists() {
            if let Err(err) = fs_watcher.watch(&wal_path, RecursiveMode::NonRecursive) {
                debug!(path = %wal_path.display(), error = %err, "failed to watch WAL sidecar, continuing without it");
            }
        }
        info!(path = %self.db_path.display(), hwm = self.hwm, "message watcher started");

        let mut poll_timer = tokio::time::interval(POLL_INTERVAL);
        poll_timer.tick().await; // first tick fires immediately
        let mut pending_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!("message watcher stopping");
                    break;
                }

                () = async {
                    match pending_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    pending_deadline = None;
                    self.check_and_trigger().await;
                }

                _ = poll_timer.tick() => {
                    self.check_and_trigger().await;
                }

                event = raw_rx.recv() => {
                    match event {
                        Some(Ok(_)) => {
                            pending_deadline = Some(Instant::now() + DEBOUNCE);
                        },
                        Some(Err(err)) => {
                            warn!(error = %err, "filesystem watch error on message database");
                        },
                        None => {
                            debug!("filesystem watcher channel closed");
                            break;
                        },
                    }
                }
            }
        }

        Ok(())
    }

    async fn check_and_trigger(&mut self) {
        match self.store.max_row_id() {
            Ok(current) if current > self.hwm => {
                let delta = current - self.hwm;
                info!(previous_hwm = self.hwm, new_hwm = current, delta, "new incoming messages detected");
                if let Some(script) = self.script_path.clone() {
                    run_script(&script, delta, self.script_timeout).await;
                }
                self.hwm = current;
            },
            Ok(_) => {},
            Err(err) => {
                warn!(error = %err, "message watcher row-id query failed");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::InMemoryMessageStore;

    #[tokio::test]
    async fn check_and_trigger_advances_hwm_without_script() {
        let store = Arc::new(InMemoryMessageStore::new(100));
        let mut watcher = MessageWatcher {
            store: Box::new(TestStore(store.clone())),
            hwm: 100,
            db_path: PathBuf::from("/tmp/does-not-matter"),
            script_path: None,
            script_timeout: Duration::from_secs(1),
        };

        store.advance_to(105);
        watcher.check_and_trigger().await;
        assert_eq!(watcher.high_water_mark(), 105);
    }

    #[tokio::test]
    async fn hwm_never_decreases_when_store_is_unchanged() {
        let store = Arc::new(InMemoryMessageStore::new(100));
        let mut watcher = MessageWatcher {
            store: Box::new(TestStore(store)),
            hwm: 100,
            db_path: PathBuf::from("/tmp/does-not-matter"),
            script_path: None,
            script_timeout: Duration::from_secs(1),
        };

        watcher.check_and_trigger().await;
        assert_eq!(watcher.high_water_mark(), 100);
    }

    struct TestStore(Arc<InMemoryMessageStore>);
    impl MessageStore for TestStore {
        fn max_row_id(&self) -> WatcherResult<i64> {
            self.0.max_row_id()
        }
    }

    #[test]
    fn wal_sidecar_path_appends_suffix() {
        let db = PathBuf::from("/tmp/chat.db");
        assert_eq!(wal_sidecar_path(&db), PathBuf::from("/tmp/chat.db-wal"));
    }
}
