//! Convenience re-export of the types most crates in the workspace need.

pub use crate::error::{CoreError, CoreResult};
pub use crate::secure_compare::constant_time_eq;
pub use crate::service::{Blob, ServiceId, ServiceOutcome, Tool, ToolAnnotations, ToolName};
pub use crate::session::SessionId;
pub use crate::token::{Permission, Secret, Token, TokenId};
