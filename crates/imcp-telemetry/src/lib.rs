//! Logging and request-correlation telemetry for the iMCP daemon and
//! bridge.
//!
//! # Example
//!
//! ```rust,no_run
//! use imcp_telemetry::{LogConfig, LogFormat, setup_logging, RequestContext};
//!
//! # fn main() -> Result<(), imcp_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("imcp_daemon=debug");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("mcp_session").with_operation("tools/call");
//! let span = ctx.span();
//! let _guard = span.enter();
//! tracing::info!("dispatching request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{setup_default_logging, setup_logging, LogConfig, LogFormat, LogTarget};
