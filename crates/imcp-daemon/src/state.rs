//! Process-wide Server state (§3: "{running, enabled} booleans, the set of
//! live Sessions, the Token Store snapshot, the Service bindings, and the
//! Listener handle").
//!
//! `DaemonState` is the thing `main.rs` builds once at startup and tears
//! down once at shutdown; everything it owns outlives any single
//! connection.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use imcp_config::DaemonConfig;
use imcp_services::{ChangeBroadcaster, Dispatcher, Service, ServiceBindings, ServiceRegistry};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::DaemonResult;
use crate::listener::{Listener, ListenerState};
use crate::token_store::TokenStore;

/// Everything the daemon needs to run, wired together from a
/// [`DaemonConfig`] and a fixed service catalog.
pub struct DaemonState {
    /// Atomically-swapped token snapshot (§4.C).
    pub tokens: TokenStore,
    /// Atomically-swapped service-enabled map (§3).
    pub bindings: ServiceBindings,
    /// Permission-gated `ListTools`/`CallTool` surface (§4.F).
    pub dispatcher: Arc<Dispatcher>,
    /// "Tool list may have changed" fan-out (§4.G).
    pub broadcaster: ChangeBroadcaster,
    /// Count of sessions currently served.
    pub live_sessions: Arc<AtomicUsize>,
    listener_state: watch::Receiver<ListenerState>,
    cancel: CancellationToken,
}

impl DaemonState {
    /// Build process-wide state over the given services, not yet running.
    /// Call [`DaemonState::spawn_listener`] to start accepting connections.
    #[must_use]
    pub fn new(services: Vec<Arc<dyn Service>>, bindings: ServiceBindings) -> Self {
        let registry = Arc::new(ServiceRegistry::new(services));
        let dispatcher = Arc::new(Dispatcher::new(registry, bindings.clone()));
        Self {
            tokens: TokenStore::empty(),
            bindings,
            dispatcher,
            broadcaster: ChangeBroadcaster::new(),
            live_sessions: Arc::new(AtomicUsize::new(0)),
            listener_state: watch::channel(ListenerState::Setup).1,
            cancel: CancellationToken::new(),
        }
    }

    /// Start the Listener as a background task, returning a handle that
    /// resolves when it stops (normally only after [`DaemonState::shutdown`]).
    pub fn spawn_listener(&mut self, port_file_path: PathBuf, config: &DaemonConfig) -> tokio::task::JoinHandle<DaemonResult<()>> {
        let (listener, state, live_sessions) = Listener::new(
            port_file_path,
            Duration::from_millis(config.bind_retry_delay_ms),
            Duration::from_secs(config.listener_supervisor_interval_secs),
            self.tokens.clone(),
            self.dispatcher.clone(),
            self.broadcaster.clone(),
        );
        self.listener_state = state;
        self.live_sessions = live_sessions;

        let cancel = self.cancel.clone();
        tokio::spawn(listener.run(cancel))
    }

    /// Current observable state of the Listener.
    #[must_use]
    pub fn listener_state(&self) -> ListenerState {
        *self.listener_state.borrow()
    }

    /// Number of sessions currently being served.
    #[must_use]
    pub fn live_session_count(&self) -> usize {
        self.live_sessions.load(Ordering::SeqCst)
    }

    /// Signal every running component to stop. Per §3: "process-wide state
    /// ... is torn down at process stop".
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// A token that fires when [`DaemonState::shutdown`] is called, for
    /// wiring into other components (the Message Watcher, a signal handler).
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
