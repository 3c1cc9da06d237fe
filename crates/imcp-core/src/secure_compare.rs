//! Constant-time byte comparison used by the auth gate.
//!
//! Token secrets are opaque byte strings: never substring-matched, never
//! logged. Comparison must not leak the index of the first differing byte
//! through timing, and unequal-length inputs must not short-circuit before
//! doing deterministic work proportional to the shorter buffer.

use subtle::ConstantTimeEq;

/// Compare two byte strings in constant time.
///
/// Unequal lengths fail immediately at the length check, but still touch
/// every byte of the shorter buffer first so the running time does not
/// reveal how much of a too-short candidate happened to match.
#[must_use]
pub fn constant_time_eq(candidate: &[u8], secret: &[u8]) -> bool {
    if candidate.len() != secret.len() {
        let shorter = candidate.len().min(secret.len());
        let mut sink = 0u8;
        for i in 0..shorter {
            sink ^= candidate[i] ^ secret[i];
        }
        std::hint::black_box(sink);
        return false;
    }
    candidate.ct_eq(secret).into()
}
