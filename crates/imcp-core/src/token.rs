//! Token and permission vocabulary (§3 Data Model — Token).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::service::ServiceId;

/// Stable, opaque identifier for a [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    /// Generate a new random token id.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte secret, rendered as 64 lowercase hex characters.
///
/// Generated once from a cryptographic RNG, never mutated, never logged.
/// Deliberately does not implement [`Serialize`] — outbound responses can
/// never accidentally re-expose a secret once it has been admitted into a
/// [`Token`]. Inbound loading (from the external trust boundary that owns
/// token lifecycle, or from a test fixture) still needs [`Deserialize`].
#[derive(Clone, Deserialize)]
pub struct Secret(String);

impl Secret {
    /// Generate a new secret from a cryptographic RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse a secret from its 64-lowercase-hex-character rendering.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedSecret`] if `s` is not exactly 64
    /// lowercase hex characters.
    pub fn from_hex(s: &str) -> CoreResult<Self> {
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return Err(CoreError::MalformedSecret);
        }
        Ok(Self(s.to_string()))
    }

    /// The secret's bytes, as its hex-ASCII rendering — the representation
    /// the auth gate compares the token preamble against.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Per-service authorization level granted to a [`Token`].
///
/// Absence of an entry in [`Token::permissions`] is equivalent to `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    /// No access to the service at all.
    #[default]
    Off,
    /// Only tools with `readOnlyHint = true` are visible/callable.
    ReadOnly,
    /// All of the service's tools are visible/callable.
    Full,
}

impl Permission {
    /// Whether a tool with the given `readOnlyHint` is permitted at this
    /// permission level.
    #[must_use]
    pub fn permits(self, read_only_hint: bool) -> bool {
        match self {
            Permission::Off => false,
            Permission::ReadOnly => read_only_hint,
            Permission::Full => true,
        }
    }
}

/// An authentication token: identity, secret, and per-service permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    /// Stable opaque id.
    pub id: TokenId,
    /// Human-readable name, shown in the UI. Canonical for permission
    /// decisions — never the client-declared name from `initialize`.
    pub name: String,
    /// The 32-byte secret, rendered as 64 lowercase hex characters.
    pub secret: Secret,
    /// When the token was created.
    pub created_at: DateTime<Utc>,
    /// Per-service permission map. Missing entries mean [`Permission::Off`].
    #[serde(default)]
    pub permissions: HashMap<ServiceId, Permission>,
}

impl Token {
    /// The permission level this token holds for `service`, defaulting to
    /// [`Permission::Off`] when no entry is present.
    #[must_use]
    pub fn permission_for(&self, service: &ServiceId) -> Permission {
        self.permissions.get(service).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_round_trips_through_hex() {
        let generated = Secret::generate();
        let hex = String::from_utf8(generated.as_bytes().to_vec()).unwrap();
        let parsed = Secret::from_hex(&hex).unwrap();
        assert_eq!(generated.as_bytes(), parsed.as_bytes());
    }

    #[test]
    fn secret_rejects_wrong_length() {
        assert!(Secret::from_hex("deadbeef").is_err());
    }

    #[test]
    fn secret_rejects_uppercase() {
        let upper = "AA".repeat(32);
        assert!(Secret::from_hex(&upper).is_err());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::generate();
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }

    #[test]
    fn missing_permission_defaults_to_off() {
        let token = Token {
            id: TokenId::new(),
            name: "test".to_string(),
            secret: Secret::generate(),
            created_at: Utc::now(),
            permissions: HashMap::new(),
        };
        assert_eq!(
            token.permission_for(&ServiceId::new("CalendarService")),
            Permission::Off
        );
    }

    #[test]
    fn permission_gates_on_read_only_hint() {
        assert!(!Permission::Off.permits(true));
        assert!(Permission::ReadOnly.permits(true));
        assert!(!Permission::ReadOnly.permits(false));
        assert!(Permission::Full.permits(true));
        assert!(Permission::Full.permits(false));
    }
}
