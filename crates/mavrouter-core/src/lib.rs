//! mavrouter core - platform-independent routing configuration and process control
//!
//! This crate provides the route configuration and its validation, the
//! MAVProxy command synthesizer, the process traits implemented by the
//! platform crates and the lifecycle manager that drives them.

mod command;
mod config;
mod error;
mod lifecycle;
mod platform;
mod ports;
mod process;

pub use command::*;
pub use config::*;
pub use error::*;
pub use lifecycle::*;
pub use platform::*;
pub use ports::*;
pub use process::*;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
