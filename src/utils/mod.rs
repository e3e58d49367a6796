//! Shared helpers.

pub mod exec;
pub mod mime;
pub mod path;
mod plural;

pub use plural::{plural_count, plural_s};
