//! The stdio<->TCP proxy process assistant clients launch (§4.H, §6
//! Bridge CLI). Bridges a client's JSON-RPC stdin/stdout stream to the
//! daemon's loopback TCP port, after reading the Port File and sending
//! the token preamble.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod bridge;
mod error;
mod framer;
mod heartbeat;
mod pipe;
mod port_wait;

pub use bridge::{log_session_outcome, run_session, SessionOutcome};
pub use error::{BridgeError, BridgeResult};
pub use framer::MessageFramer;
pub use heartbeat::{strip_heartbeat, FRAME_LEN, MAGIC};
pub use port_wait::{wait_for_port, DEFAULT_BUDGET};
