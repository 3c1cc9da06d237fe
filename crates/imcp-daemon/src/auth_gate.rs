//! Auth Gate: the one-line, constant-time token check a new connection
//! must pass before a Session is created (§4.D).

use std::time::Duration;

use imcp_core::{constant_time_eq, Token};
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt as _;

use crate::token_store::TokenSnapshot;

/// Time budget for the whole token-line read (§4.D: "a 5-second timeout").
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum bytes accepted before a newline (§4.D, §6: "length > 256 bytes
/// before a newline closes the connection").
const MAX_LINE_BYTES: usize = 256;

/// Read one line (up to `\n`) from `reader`, bounded by [`READ_TIMEOUT`]
/// and [`MAX_LINE_BYTES`]. Returns `None` on timeout, EOF, or an
/// oversized line — all three are treated identically by the caller
/// (close the socket, write nothing).
async fn read_line_bounded<R>(reader: &mut R) -> Option<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let read = tokio::time::timeout(READ_TIMEOUT, async {
        let mut buf = Vec::new();
        loop {
            let available = reader.fill_buf().await.ok()?;
            if available.is_empty() {
                return None;
            }
            if let Some(newline_at) = available.iter().position(|&b| b == b'\n') {
                buf.extend_from_slice(&available[..newline_at]);
                let consumed = newline_at + 1;
                reader.consume(consumed);
                return Some(buf);
            }
            let consumed = available.len();
            buf.extend_from_slice(available);
            reader.consume(consumed);
            if buf.len() > MAX_LINE_BYTES {
                return None;
            }
        }
    })
    .await;

    match read {
        Ok(Some(buf)) if buf.len() <= MAX_LINE_BYTES => Some(buf),
        _ => None,
    }
}

/// Authenticate a freshly accepted connection against `tokens`.
///
/// Reads one line, trims surrounding whitespace, and compares it in
/// constant time against every token in the snapshot in order. Per §4.D's
/// failure mode, an empty snapshot rejects immediately without reading
/// anything.
pub async fn authenticate<R>(reader: &mut R, tokens: &TokenSnapshot) -> Option<Token>
where
    R: AsyncBufRead + Unpin,
{
    if tokens.is_empty() {
        return None;
    }

    let line = read_line_bounded(reader).await?;
    let candidate = trim_ascii_whitespace(&line);

    tokens
        .iter()
        .find(|token| constant_time_eq(candidate, token.secret.as_bytes()))
        .cloned()
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use imcp_core::{Secret, TokenId};
    use tokio::io::BufReader;

    use super::*;

    fn token_with_secret(secret: Secret) -> Token {
        Token {
            id: TokenId::new(),
            name: "test".to_string(),
            secret,
            created_at: Utc::now(),
            permissions: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn empty_snapshot_rejects_without_reading() {
        let mut reader = BufReader::new(std::io::Cursor::new(Vec::<u8>::new()));
        let tokens = TokenSnapshot::new(Vec::new());
        assert!(authenticate(&mut reader, &tokens).await.is_none());
    }

    #[tokio::test]
    async fn matching_secret_authenticates() {
        let secret = Secret::generate();
        let token = token_with_secret(secret.clone());
        let tokens = TokenSnapshot::new(vec![token.clone()]);

        let mut line = String::from_utf8(secret.as_bytes().to_vec()).unwrap();
        line.push('\n');
        let mut reader = BufReader::new(std::io::Cursor::new(line.into_bytes()));

        let authenticated = authenticate(&mut reader, &tokens).await.expect("should authenticate");
        assert_eq!(authenticated.id, token.id);
    }

    #[tokio::test]
    async fn whitespace_is_trimmed_before_comparison() {
        let secret = Secret::generate();
        let token = token_with_secret(secret.clone());
        let tokens = TokenSnapshot::new(vec![token]);

        let mut line = String::from_utf8(secret.as_bytes().to_vec()).unwrap();
        line.push_str("  \n");
        let mut reader = BufReader::new(std::io::Cursor::new(format!("  {line}").into_bytes()));

        assert!(authenticate(&mut reader, &tokens).await.is_some());
    }

    #[tokio::test]
    async fn non_matching_secret_rejects() {
        let tokens = TokenSnapshot::new(vec![token_with_secret(Secret::generate())]);
        let mut reader = BufReader::new(std::io::Cursor::new(b"not-a-real-secret\n".to_vec()));
        assert!(authenticate(&mut reader, &tokens).await.is_none());
    }

    #[tokio::test]
    async fn oversized_line_rejects() {
        let tokens = TokenSnapshot::new(vec![token_with_secret(Secret::generate())]);
        let mut oversized = vec![b'a'; MAX_LINE_BYTES + 1];
        oversized.push(b'\n');
        let mut reader = BufReader::new(std::io::Cursor::new(oversized));
        assert!(authenticate(&mut reader, &tokens).await.is_none());
    }

    #[tokio::test]
    async fn eof_without_newline_rejects() {
        let tokens = TokenSnapshot::new(vec![token_with_secret(Secret::generate())]);
        let mut reader = BufReader::new(std::io::Cursor::new(b"no-newline-ever".to_vec()));
        assert!(authenticate(&mut reader, &tokens).await.is_none());
    }
}
