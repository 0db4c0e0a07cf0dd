//! Command-line adapter
//!
//! Parses operator lines and runs them against a `ControlSession`.

pub mod commands;
pub mod dispatcher;

pub use commands::{CliCommand, parse_command};
pub use dispatcher::{Dispatcher, Flow};
