//! Token Store: the atomically-swapped snapshot of authentication tokens
//! (§3 Data Model — Token; §4.C).
//!
//! Same shape as `imcp_services::ServiceBindings`: a reader takes one `Arc`
//! clone of the current snapshot for the whole operation instead of
//! holding a lock across it, a writer replaces the snapshot wholesale.
//! Tokens are kept in an ordered `Vec`, not a map keyed by secret, because
//! §4.D requires a linear constant-time scan against *every* token rather
//! than a fast hash lookup that would leak which token (if any) was close.

use std::sync::{Arc, RwLock};

use imcp_core::Token;

/// A point-in-time, ordered set of tokens (§3: "held in an ordered
/// collection to allow stable listing").
#[derive(Debug, Clone, Default)]
pub struct TokenSnapshot {
    tokens: Vec<Token>,
}

impl TokenSnapshot {
    /// Build a snapshot from an ordered list of tokens.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Whether this snapshot has no tokens at all (§4.D failure mode: "if
    /// the Token Store snapshot is empty, the gate rejects all connections
    /// before any read").
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate the tokens in stable order, for the Auth Gate's linear scan.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

/// Thread-safe holder for the current [`TokenSnapshot`].
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<RwLock<Arc<TokenSnapshot>>>,
}

impl TokenStore {
    /// Start from an initial snapshot.
    #[must_use]
    pub fn new(initial: TokenSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// An empty store, rejecting every connection until a snapshot is
    /// published.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(TokenSnapshot::default())
    }

    /// Take a reference to the snapshot in effect right now. A connection
    /// authenticated against this `Arc` keeps using it for its whole
    /// lifetime even if a newer snapshot is published mid-session (§4.C:
    /// "in-flight sessions continue using the token they were admitted
    /// with").
    #[must_use]
    pub fn current(&self) -> Arc<TokenSnapshot> {
        self.inner.read().expect("token store lock poisoned").clone()
    }

    /// Atomically replace the snapshot with a freshly built one.
    pub fn publish(&self, tokens: Vec<Token>) {
        *self.inner.write().expect("token store lock poisoned") = Arc::new(TokenSnapshot::new(tokens));
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("token_count", &self.current().tokens.len())
            .finish()
    }
}
