//! Daemon configuration: an optional TOML file describing non-secret
//! settings (bind retry timing, watcher script, logging). Token and
//! permission state never lives here — see `imcp-core::Token` and §4.C.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod loader;
mod paths;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_file};
pub use paths::{default_config_path, default_port_file_path, support_dir};
pub use types::{DaemonConfig, LogFormat};
