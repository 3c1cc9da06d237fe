//! Service-enabled bindings as an atomically-swapped snapshot.
//!
//! Per the "Global snapshots for config" design note: readers (the
//! dispatcher, on every `ListTools`/`CallTool`) take one `Arc` for the
//! duration of a request rather than holding a lock across it; writers
//! build a whole new map and swap the pointer. Modeled the same way
//! `Secrets` guards its map, but swapping the snapshot instead of mutating
//! it in place, since the server-wide and per-service enabled flags change
//! far less often than they're read.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use imcp_core::ServiceId;

/// A point-in-time view of which services are enabled, plus the
/// process-wide enabled flag (§3 Server state).
#[derive(Debug, Clone, Default)]
pub struct BindingsSnapshot {
    server_enabled: bool,
    service_enabled: HashMap<ServiceId, bool>,
}

impl BindingsSnapshot {
    /// Build a snapshot with the server enabled and the given services
    /// enabled.
    #[must_use]
    pub fn new(server_enabled: bool, service_enabled: HashMap<ServiceId, bool>) -> Self {
        Self {
            server_enabled,
            service_enabled,
        }
    }

    /// Whether the server as a whole is serving requests.
    #[must_use]
    pub fn server_enabled(&self) -> bool {
        self.server_enabled
    }

    /// Whether `service` is globally enabled. Services with no explicit
    /// entry are treated as disabled.
    #[must_use]
    pub fn service_enabled(&self, service: &ServiceId) -> bool {
        self.service_enabled.get(service).copied().unwrap_or(false)
    }
}

/// Thread-safe holder for the current [`BindingsSnapshot`]; `current()`
/// clones the `Arc` cheaply for a reader, `publish` swaps in a new one.
#[derive(Clone)]
pub struct ServiceBindings {
    inner: Arc<RwLock<Arc<BindingsSnapshot>>>,
}

impl ServiceBindings {
    /// Start from an initial snapshot.
    #[must_use]
    pub fn new(initial: BindingsSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Take a reference to the snapshot in effect right now.
    #[must_use]
    pub fn current(&self) -> Arc<BindingsSnapshot> {
        self.inner
            .read()
            .expect("bindings lock poisoned")
            .clone()
    }

    /// Atomically replace the snapshot.
    pub fn publish(&self, snapshot: BindingsSnapshot) {
        *self.inner.write().expect("bindings lock poisoned") = Arc::new(snapshot);
    }
}

impl std::fmt::Debug for ServiceBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current();
        f.debug_struct("ServiceBindings")
            .field("server_enabled", &current.server_enabled)
            .field("service_count", &current.service_enabled.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_service_defaults_to_disabled() {
        let snapshot = BindingsSnapshot::new(true, HashMap::new());
        assert!(!snapshot.service_enabled(&ServiceId::new("CalendarService")));
    }

    #[test]
    fn publish_replaces_the_whole_snapshot() {
        let bindings = ServiceBindings::new(BindingsSnapshot::new(true, HashMap::new()));
        assert!(!bindings
            .current()
            .service_enabled(&ServiceId::new("CalendarService")));

        let mut enabled = HashMap::new();
        enabled.insert(ServiceId::new("CalendarService"), true);
        bindings.publish(BindingsSnapshot::new(true, enabled));

        assert!(bindings
            .current()
            .service_enabled(&ServiceId::new("CalendarService")));
    }

    #[test]
    fn server_disabled_is_independent_of_service_bindings() {
        let mut enabled = HashMap::new();
        enabled.insert(ServiceId::new("CalendarService"), true);
        let snapshot = BindingsSnapshot::new(false, enabled);
        assert!(!snapshot.server_enabled());
        assert!(snapshot.service_enabled(&ServiceId::new("CalendarService")));
    }
}
