//! Command-line interface module.

mod args;
pub mod generate;
pub mod preview;
pub mod routes;

pub use args::{Cli, Commands, LiveArgs};
