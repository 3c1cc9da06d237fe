//! Drives one bridge session: writes the token preamble, then races the
//! two duplex directions under a supervisor until either one finishes
//! (§4.H: "either task completing cancels the other and tears down the
//! connection").

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::BridgeError;
use crate::pipe::{self, DirectionOutcome};

/// Why one bridge session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The remote side closed cleanly (EOF on the network direction with
    /// no error).
    CleanClose,
    /// A connection-reset / not-connected class error — per the retry
    /// policy this terminates the bridge outright.
    RemoteLost,
    /// Repeated empty/timed-out network reads — reconnect after a brief
    /// delay.
    Timeout,
    /// Any other failure — retry after the longer backoff.
    Failed(BridgeError),
}

fn classify(outcome: DirectionOutcome) -> SessionOutcome {
    match outcome {
        DirectionOutcome::Eof => SessionOutcome::CleanClose,
        DirectionOutcome::Timeout => SessionOutcome::Timeout,
        DirectionOutcome::Error(err) if err.is_remote_lost() => SessionOutcome::RemoteLost,
        DirectionOutcome::Error(err) => SessionOutcome::Failed(err),
    }
}

/// Write the token preamble, then pump both directions until one ends.
///
/// `tcp` must implement both halves of the duplex connection; it is split
/// internally so each direction owns its own half.
pub async fn run_session<In, Out, Tcp>(stdin: In, stdout: Out, mut tcp: Tcp, token: &str) -> SessionOutcome
where
    In: AsyncRead + Unpin + Send + 'static,
    Out: AsyncWrite + Unpin + Send + 'static,
    Tcp: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    if let Err(err) = tcp.write_all(format!("{token}\n").as_bytes()).await {
        let wrapped = BridgeError::TokenWrite(err);
        return if wrapped.is_remote_lost() {
            SessionOutcome::RemoteLost
        } else {
            SessionOutcome::Failed(wrapped)
        };
    }

    let (tcp_read, tcp_write) = tokio::io::split(tcp);

    let mut stdin_task = tokio::spawn(pipe::pump_stdin_to_tcp(stdin, tcp_write));
    let mut net_task = tokio::spawn(pipe::pump_tcp_to_stdout(tcp_read, stdout));

    tokio::select! {
        result = &mut stdin_task => {
            net_task.abort();
            let outcome = result.unwrap_or(DirectionOutcome::Eof);
            pipe::log_outcome("stdin->tcp", &outcome);
            // Stdin EOF (the client closed its end) is not by itself the
            // network direction's notion of "clean close"; only the network
            // direction's EOF means the remote server hung up.
            match outcome {
                DirectionOutcome::Eof => SessionOutcome::CleanClose,
                other => classify(other),
            }
        }
        result = &mut net_task => {
            stdin_task.abort();
            let outcome = result.unwrap_or(DirectionOutcome::Eof);
            pipe::log_outcome("tcp->stdout", &outcome);
            classify(outcome)
        }
    }
}

/// Log a session's outcome at an appropriate level before the caller
/// decides on a retry.
pub fn log_session_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::CleanClose => info!("bridge session ended cleanly"),
        SessionOutcome::RemoteLost => debug!("bridge session lost its remote connection"),
        SessionOutcome::Timeout => debug!("bridge session timed out, reconnecting"),
        SessionOutcome::Failed(err) => debug!(error = %err, "bridge session failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn writes_token_preamble_before_any_other_traffic() {
        let (server, mut server_observer) = duplex(4096);
        let stdin = std::io::Cursor::new(Vec::<u8>::new());
        let stdout = Vec::new();

        let task = tokio::spawn(async move {
            run_session(stdin, stdout, server, "deadbeef").await
        });

        let mut buf = [0u8; 64];
        use tokio::io::AsyncReadExt;
        let n = server_observer.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"deadbeef\n");

        drop(server_observer);
        let _ = task.await;
    }

    #[tokio::test]
    async fn remote_eof_on_network_side_is_a_clean_close() {
        let (server, mut server_observer) = duplex(4096);
        // Never produces non-whitespace, so the stdin direction never
        // forwards anything and never reaches EOF on its own — only the
        // network direction's EOF (below) should end the session.
        let stdin = tokio::io::repeat(b' ');
        let stdout = Vec::new();

        let task = tokio::spawn(async move { run_session(stdin, stdout, server, "deadbeef").await });

        use tokio::io::AsyncReadExt;
        let mut buf = [0u8; 64];
        let _ = server_observer.read(&mut buf).await.unwrap();
        drop(server_observer);

        let outcome = task.await.unwrap();
        assert!(matches!(outcome, SessionOutcome::CleanClose));
    }
}
