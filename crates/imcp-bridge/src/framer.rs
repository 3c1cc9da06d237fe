//! Newline-boundary-preserving message framing for the network-inbound
//! direction (§4.H, §8 property 7: "no message fragment is emitted to
//! stdout unless followed by a newline; partial reads never split a
//! message in the writer").

/// Accumulates bytes from successive network reads and yields complete,
/// newline-terminated messages — including the terminating newline — as
/// soon as they're available.
#[derive(Debug, Default)]
pub struct MessageFramer {
    buffer: Vec<u8>,
}

impl MessageFramer {
    /// A framer with an empty rolling buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed newly received bytes (already heartbeat-stripped) and drain
    /// every complete message now available, in order. Any trailing bytes
    /// without a newline stay buffered for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        loop {
            let Some(newline_at) = self.buffer.iter().position(|&b| b == b'\n') else {
                break;
            };
            let message: Vec<u8> = self.buffer.drain(..=newline_at).collect();
            messages.push(message);
        }
        messages
    }
}
