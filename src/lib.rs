//! Launchpad client shell
//!
//! Process bootstrap (config, tracing, wiring) and the line-oriented driver
//! used by the headless binary.

pub mod bootstrap;
pub mod driver;

pub use bootstrap::{wire_shell, Wired};
pub use driver::{run_driver, Command, CommandError};
