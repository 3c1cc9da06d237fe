//! Shared types for the iMCP server.
//!
//! This crate has no I/O of its own: it defines the vocabulary the rest of
//! the workspace builds on — tokens, services, tools, permissions, and the
//! constant-time comparison the auth gate relies on.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
pub mod prelude;
mod secure_compare;
mod service;
mod session;
mod token;

pub use error::{CoreError, CoreResult};
pub use secure_compare::constant_time_eq;
pub use service::{Blob, ServiceId, ServiceOutcome, Tool, ToolAnnotations, ToolName};
pub use session::SessionId;
pub use token::{Permission, Secret, Token, TokenId};
