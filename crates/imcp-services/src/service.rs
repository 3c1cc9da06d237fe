//! The `Service` trait (§6 Service contract).
//!
//! Kept out of `imcp-core` because invoking a service is arbitrary host I/O:
//! an `async fn` in a trait needs `async-trait` (or a boxed future), and
//! `imcp-core` is meant to stay usable from a synchronous context (the auth
//! gate's constant-time compare, for instance) without pulling in tokio.

use async_trait::async_trait;
use imcp_core::{ServiceId, ServiceOutcome, Tool};

use crate::error::ServicesResult;

/// A host capability: a stable identity, an activation gate, and a static
/// list of [`Tool`]s it answers calls for.
///
/// Replaces inheritance with a capability set, per the "Service
/// polymorphism" design note: no base class, just this trait plus the
/// tagged [`ServiceOutcome`] returned from `call`.
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable textual identity, matching the keys used in a token's
    /// permission map.
    fn id(&self) -> ServiceId;

    /// Whether the host has granted this service's underlying permission
    /// (e.g. calendar access). A service that is not activated still
    /// advertises its tools, but `activate` must succeed before `call`
    /// does anything useful.
    async fn is_activated(&self) -> bool;

    /// Request activation from the host. May prompt externally in a real
    /// integration; the in-memory sample services activate unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ServicesError::ActivationFailed`] if the host
    /// denies the request.
    async fn activate(&self) -> ServicesResult<()>;

    /// The service's static tool catalog, in a fixed order.
    fn tools(&self) -> &[Tool];

    /// Invoke a tool by name with its argument object.
    ///
    /// Returns [`ServiceOutcome::NotHandled`] if `tool_name` is not one of
    /// this service's tools — unreachable through the dispatcher once the
    /// `ToolName -> ServiceId` map is authoritative (see SPEC_FULL.md §9),
    /// but still the correct contract for a `Service` invoked directly.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ServicesError::ServiceFailure`] if the
    /// underlying host operation fails.
    async fn call(
        &self,
        tool_name: &str,
        args: serde_json::Value,
    ) -> ServicesResult<ServiceOutcome>;
}
