//! Change notification fan-out (§4.G).
//!
//! A single operation — "the tool list may have changed" — delivered to
//! every live session. Grounded in the "Per-connection actors" design note:
//! sessions never share mutable state, they only hold a receiver of this
//! broadcast and act on it independently.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. A lagging receiver only ever needs to
/// know *that* something changed, not how many times, so a small buffer
/// plus [`broadcast::Receiver::recv`]'s lag-skipping is sufficient — a
/// session that misses a few notifications still issues a fresh
/// `tools/list` on the next one it does see.
const CHANNEL_CAPACITY: usize = 16;

/// Fans out "tool list changed" events to every subscribed session.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<()>,
}

impl ChangeBroadcaster {
    /// Create a broadcaster with no subscribers yet.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future change notifications. Each session calls this
    /// once, at setup, and holds the receiver for its whole lifetime.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Notify every live subscriber that the tool list may have changed.
    /// A send with no subscribers is not an error: it just means no
    /// session is currently live to care.
    pub fn notify_changed(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBroadcaster")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
