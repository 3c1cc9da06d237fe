//! Port File, Listener, Token Store, Auth Gate, and MCP Session — the
//! components that turn a fixed service catalog into a live, authenticated
//! MCP server on loopback TCP (§4.A-§4.E).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod auth_gate;
mod error;
mod listener;
mod port_file;
mod session;
mod state;
mod token_store;

pub use auth_gate::authenticate;
pub use error::{DaemonError, DaemonResult};
pub use listener::{Listener, ListenerState};
pub use state::DaemonState;
pub use token_store::{TokenSnapshot, TokenStore};

/// Port File write/remove operations (§4.A).
pub mod port {
    pub use crate::port_file::{remove, write};
}
