//! Path utilities.
//!
//! - [`fs`]: filesystem path normalization and containment checks

pub mod fs;

pub use fs::{is_within, normalize_path};
