//! Listener: the loopback TCP socket new connections arrive on (§4.B).
//!
//! Bind-accept-spawn, the same shape as `astrid-kernel::socket`'s Unix
//! domain socket loop, adapted from a fixed path to an OS-assigned
//! ephemeral port and carrying a self-healing restart policy on top: a
//! failed bind or a dead accept loop is retried rather than fatal, and a
//! supervisor forces a fresh bind cycle if the listener is ever stuck
//! outside `Ready` for a whole interval.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use imcp_services::{ChangeBroadcaster, Dispatcher};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth_gate;
use crate::error::DaemonResult;
use crate::port_file;
use crate::session::run_session;
use crate::token_store::TokenStore;

/// Observable lifecycle of the Listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Binding a fresh socket.
    Setup,
    /// Backing off after a failed bind or accept loop.
    Waiting,
    /// Bound, port file written, accepting connections.
    Ready,
    /// The most recent bind or accept attempt failed.
    Failed,
    /// Shutting down; the port file has been removed.
    Cancelled,
}

enum AcceptOutcome {
    Cancelled,
    Failed,
}

/// Binds a loopback TCP socket on an OS-assigned port, publishes it via the
/// Port File, and spawns one task per accepted connection.
pub struct Listener {
    bind_retry_delay: Duration,
    supervisor_interval: Duration,
    port_file_path: PathBuf,
    tokens: TokenStore,
    dispatcher: Arc<Dispatcher>,
    broadcaster: ChangeBroadcaster,
    state: watch::Sender<ListenerState>,
    live_sessions: Arc<AtomicUsize>,
}

impl Listener {
    /// Build a listener, returning it alongside a receiver callers can use
    /// to observe its lifecycle and a shared counter of live sessions (§3:
    /// "the set of live Sessions").
    #[must_use]
    pub fn new(
        port_file_path: PathBuf,
        bind_retry_delay: Duration,
        supervisor_interval: Duration,
        tokens: TokenStore,
        dispatcher: Arc<Dispatcher>,
        broadcaster: ChangeBroadcaster,
    ) -> (Self, watch::Receiver<ListenerState>, Arc<AtomicUsize>) {
        let (state, receiver) = watch::channel(ListenerState::Setup);
        let live_sessions = Arc::new(AtomicUsize::new(0));
        (
            Self {
                bind_retry_delay,
                supervisor_interval,
                port_file_path,
                tokens,
                dispatcher,
                broadcaster,
                state,
                live_sessions: live_sessions.clone(),
            },
            receiver,
            live_sessions,
        )
    }

    /// Run the bind-accept-spawn loop until `cancel` fires. Never returns
    /// an error: bind and accept failures retry after [`Self::bind_retry_delay`]
    /// rather than propagating (§4.B: "self-healing").
    pub async fn run(self, cancel: CancellationToken) -> DaemonResult<()> {
        let restart = Arc::new(Mutex::new(CancellationToken::new()));
        let supervisor = tokio::spawn(Self::supervise(
            self.state.subscribe(),
            restart.clone(),
            self.supervisor_interval,
        ));

        self.run_loop(cancel, restart).await;
        supervisor.abort();
        Ok(())
    }

    async fn run_loop(&self, cancel: CancellationToken, restart: Arc<Mutex<CancellationToken>>) {
        loop {
            if cancel.is_cancelled() {
                self.finish_cancelled();
                return;
            }

            let _ = self.state.send(ListenerState::Setup);
            let my_restart = {
                let mut guard = restart.lock().await;
                if guard.is_cancelled() {
                    *guard = CancellationToken::new();
                }
                guard.clone()
            };

            let listener = match TcpListener::bind(("127.0.0.1", 0)).await {
                Ok(listener) => listener,
                Err(err) => {
                    warn!(error = %err, "failed to bind loopback listener");
                    if self.back_off(&cancel).await {
                        return;
                    }
                    continue;
                },
            };

            let port = match listener.local_addr() {
                Ok(addr) => addr.port(),
                Err(err) => {
                    warn!(error = %err, "failed to read bound port");
                    if self.back_off(&cancel).await {
                        return;
                    }
                    continue;
                },
            };

            if let Err(err) = port_file::write(&self.port_file_path, port) {
                error!(error = %err, "failed to write port file");
                if self.back_off(&cancel).await {
                    return;
                }
                continue;
            }

            let _ = self.state.send(ListenerState::Ready);
            info!(port, "listener ready");

            let outcome = self.accept_loop(&listener, &cancel, &my_restart).await;
            port_file::remove(&self.port_file_path);

            match outcome {
                AcceptOutcome::Cancelled => {
                    self.finish_cancelled();
                    return;
                },
                AcceptOutcome::Failed => {
                    let _ = self.state.send(ListenerState::Failed);
                    if self.back_off(&cancel).await {
                        return;
                    }
                },
            }
        }
    }

    fn finish_cancelled(&self) {
        let _ = self.state.send(ListenerState::Cancelled);
        port_file::remove(&self.port_file_path);
    }

    /// Sleep for the retry delay, racing `cancel`. Returns `true` if the
    /// caller should stop entirely rather than retry.
    async fn back_off(&self, cancel: &CancellationToken) -> bool {
        let _ = self.state.send(ListenerState::Waiting);
        tokio::select! {
            () = tokio::time::sleep(self.bind_retry_delay) => false,
            () = cancel.cancelled() => {
                self.finish_cancelled();
                true
            },
        }
    }

    async fn accept_loop(
        &self,
        listener: &TcpListener,
        cancel: &CancellationToken,
        restart: &CancellationToken,
    ) -> AcceptOutcome {
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => return AcceptOutcome::Cancelled,
                () = restart.cancelled() => {
                    debug!("listener restart forced by supervisor");
                    return AcceptOutcome::Failed;
                },

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!(%addr, "accepted connection");
                        self.spawn_connection(stream, cancel.child_token());
                    },
                    Err(err) => {
                        warn!(error = %err, "accept failed");
                        return AcceptOutcome::Failed;
                    },
                },
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, cancel: CancellationToken) {
        let tokens = self.tokens.clone();
        let dispatcher = self.dispatcher.clone();
        let changes = self.broadcaster.subscribe();
        let live_sessions = self.live_sessions.clone();

        tokio::spawn(async move {
            let (read_half, write_half) = stream.into_split();
            let mut reader = tokio::io::BufReader::new(read_half);
            let snapshot = tokens.current();

            let Some(token) = auth_gate::authenticate(&mut reader, &snapshot).await else {
                debug!("connection rejected at auth gate");
                return;
            };

            live_sessions.fetch_add(1, Ordering::SeqCst);
            if let Err(err) = run_session(reader, write_half, token, dispatcher, changes, cancel).await {
                warn!(error = %err, "mcp session ended with an error");
            }
            live_sessions.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Forces a fresh bind cycle if the listener has been stuck outside
    /// `Ready` since the previous tick (§4.B: "every 10 seconds").
    async fn supervise(
        mut state: watch::Receiver<ListenerState>,
        restart: Arc<Mutex<CancellationToken>>,
        interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stuck = !matches!(*state.borrow(), ListenerState::Ready | ListenerState::Setup);
            if stuck {
                warn!("listener supervisor forcing restart");
                restart.lock().await.cancel();
            }
        }
    }
}
