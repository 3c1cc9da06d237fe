//! Message Watcher: observes a host message database for new incoming
//! rows and triggers an external script on growth (§4.I).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod store;
mod trigger;
mod watcher;

pub use error::{WatcherError, WatcherResult};
pub use store::{InMemoryMessageStore, MessageStore, SqliteMessageStore};
pub use watcher::{MessageWatcher, DEBOUNCE, POLL_INTERVAL, SCRIPT_TIMEOUT};
