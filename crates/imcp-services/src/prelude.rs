//! Convenience re-export of the types most callers need.

pub use crate::bindings::{BindingsSnapshot, ServiceBindings};
pub use crate::broadcaster::ChangeBroadcaster;
pub use crate::dispatcher::{DispatchOutcome, Dispatcher, ToolContent};
pub use crate::error::{ServicesError, ServicesResult};
pub use crate::registry::ServiceRegistry;
pub use crate::service::Service;
