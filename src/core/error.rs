//! Error taxonomy for a generation run.
//!
//! | Type                 | Scope       | Effect on the run                      |
//! |----------------------|-------------|----------------------------------------|
//! | `PatternError`       | endpoint    | endpoint skipped with a warning        |
//! | `ConfigurationError` | route       | route skipped, reported in the summary |
//! | `ExpansionError`     | route       | route skipped, reported in the summary |
//! | `FetchError`         | concrete uri| non-2xx recoverable, transport fatal   |
//! | `WriteError`         | run         | fatal                                  |

use std::path::PathBuf;

use thiserror::Error;

/// A route pattern that cannot be parsed into literals and placeholders.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with `/`")]
    NotAbsolute(String),

    #[error("pattern `{0}` has an unbalanced `{{` or `}}`")]
    Unbalanced(String),

    #[error("pattern `{0}` contains a wildcard and cannot be enumerated")]
    Wildcard(String),

    #[error("pattern `{0}` has a placeholder without a name")]
    EmptyName(String),

    #[error("pattern `{pattern}` declares `{name}` twice")]
    DuplicateName { pattern: String, name: String },

    #[error("pattern `{pattern}` has an invalid constraint for `{name}`")]
    Constraint {
        pattern: String,
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure reported by a variable provider itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no binding list for method `{0}`")]
    UnknownMethod(String),

    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid binding data: {0}")]
    Invalid(String),

    #[error("command failed: {0}")]
    Command(String),
}

/// Bad or missing provider reference, or a provider that failed when invoked.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown variable provider `{0}`")]
    UnknownProvider(String),

    #[error("provider `{provider}` failed for method `{method}`")]
    Provider {
        provider: String,
        method: String,
        #[source]
        source: ProviderError,
    },
}

/// A binding that cannot satisfy the placeholders of a pattern.
#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("`{{{placeholder}}}` in `{pattern}` has no value in binding #{index}")]
    MissingBinding {
        pattern: String,
        placeholder: String,
        index: usize,
    },

    #[error("value `{value}` for `{{{placeholder}}}` in `{pattern}` does not match `{constraint}`")]
    ConstraintMismatch {
        pattern: String,
        placeholder: String,
        value: String,
        constraint: String,
    },
}

/// Failure while snapshotting one concrete URI.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response. The body is still materialized.
    #[error("`{uri}` answered {status}")]
    Status { uri: String, status: u16 },

    #[error("`{uri}` cannot be joined onto the live base url")]
    Url {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to `{uri}` failed")]
    Transport {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Transport-level failures abort the run unless failures are collected.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Status { .. })
    }
}

/// Filesystem failure during clear, copy or write.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to clear `{}`", .path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy `{}` to `{}`", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("uri `{0}` does not map to a file inside the distribution root")]
    UnsafePath(String),

    #[error("{0} uri(s) claim a conflicting file target")]
    Conflicts(usize),
}
