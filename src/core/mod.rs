//! Core types - pure abstractions shared across the codebase.

pub mod error;
mod method;
mod state;
mod summary;

pub use error::{
    ConfigurationError, ExpansionError, FetchError, PatternError, ProviderError, WriteError,
};
pub use method::HttpMethod;
pub use state::{Cancellation, setup_shutdown_handler};
pub use summary::{FatalError, RunSummary, SkippedRoute, StatusWarning, error_chain};
