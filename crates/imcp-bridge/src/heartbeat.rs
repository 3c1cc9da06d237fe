//! Heartbeat sideband filtering for the network-inbound direction (§4.H
//! Network direction; §9 "Heartbeat framing": "parsed strictly by (magic,
//! length) — do not attempt to infer boundaries from content").
//!
//! The heartbeat is a 12-byte out-of-band frame — a 4-byte magic sequence
//! followed by an opaque 8-byte payload — interleaved in the TCP byte
//! stream ahead of JSON-RPC framing. It carries no information the bridge
//! needs; it only has to be removed before the remaining bytes are split
//! on newlines.

/// The heartbeat frame's magic prefix.
pub const MAGIC: [u8; 4] = *b"IMhb";

/// Total size of a heartbeat frame: magic plus its opaque payload.
pub const FRAME_LEN: usize = 12;

fn find_magic(buf: &[u8]) -> Option<usize> {
    buf.windows(MAGIC.len()).position(|w| w == MAGIC)
}

/// Strip every complete heartbeat frame from `chunk`.
///
/// Each time the magic is found with a full [`FRAME_LEN`] bytes available
/// from that point, exactly those bytes are removed and scanning resumes
/// in the remainder — a single chunk can carry any number of frames. If
/// the magic is found but the chunk ends before the frame completes, the
/// whole chunk (including anything already kept from earlier frames) is
/// discarded — a partial heartbeat means the bridge has lost frame sync
/// and the safest recovery is to wait for the next read rather than guess
/// where JSON-RPC content resumes.
#[must_use]
pub fn strip_heartbeat(chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunk.len());
    let mut rest = chunk;

    loop {
        let Some(start) = find_magic(rest) else {
            out.extend_from_slice(rest);
            return out;
        };

        if rest.len() - start < FRAME_LEN {
            return Vec::new();
        }

        out.extend_from_slice(&rest[..start]);
        rest = &rest[start + FRAME_LEN..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat_frame() -> Vec<u8> {
        let mut frame = MAGIC.to_vec();
        frame.extend_from_slice(&[0u8; 8]);
        frame
    }

    #[test]
    fn passes_through_a_chunk_with_no_heartbeat() {
        let chunk = b"{\"jsonrpc\":\"2.0\"}\n".to_vec();
        assert_eq!(strip_heartbeat(&chunk), chunk);
    }

    #[test]
    fn strips_a_complete_heartbeat_between_two_messages() {
        let mut chunk = b"{\"id\":1}\n".to_vec();
        chunk.extend_from_slice(&heartbeat_frame());
        chunk.extend_from_slice(b"{\"id\":2}\n");

        let stripped = strip_heartbeat(&chunk);
        assert_eq!(stripped, b"{\"id\":1}\n{\"id\":2}\n".to_vec());
    }

    #[test]
    fn strips_multiple_complete_heartbeats_in_one_chunk() {
        let mut chunk = b"{\"id\":1}\n".to_vec();
        chunk.extend_from_slice(&heartbeat_frame());
        chunk.extend_from_slice(b"{\"id\":2}\n");
        chunk.extend_from_slice(&heartbeat_frame());
        chunk.extend_from_slice(&heartbeat_frame());
        chunk.extend_from_slice(b"{\"id\":3}\n");

        let stripped = strip_heartbeat(&chunk);
        assert_eq!(stripped, b"{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n".to_vec());
    }

    #[test]
    fn strips_a_heartbeat_that_fills_the_whole_chunk() {
        let chunk = heartbeat_frame();
        assert_eq!(strip_heartbeat(&chunk), Vec::<u8>::new());
    }

    #[test]
    fn discards_the_whole_chunk_on_a_partial_heartbeat() {
        let mut chunk = b"{\"id\":1}\n".to_vec();
        chunk.extend_from_slice(&MAGIC);
        chunk.extend_from_slice(&[0u8; 3]); // short of the full 8-byte payload

        assert_eq!(strip_heartbeat(&chunk), Vec::<u8>::new());
    }

    #[test]
    fn empty_chunk_stays_empty() {
        assert_eq!(strip_heartbeat(&[]), Vec::<u8>::new());
    }
}
