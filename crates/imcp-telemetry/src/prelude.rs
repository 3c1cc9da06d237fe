//! Convenience re-export of the types most callers need.

pub use crate::context::{RequestContext, RequestGuard};
pub use crate::error::{TelemetryError, TelemetryResult};
pub use crate::logging::{setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget};
