//! Run summary: counts and per-item reports of a generation run.

use std::error::Error;

use owo_colors::OwoColorize;

use crate::log;
use crate::utils::{plural_count, plural_s};

/// A route that produced no concrete URI because expansion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoute {
    pub route: String,
    pub reason: String,
}

/// A snapshot captured with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWarning {
    pub uri: String,
    pub status: u16,
}

/// A fatal condition: transport failure, write failure or target conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalError {
    pub subject: String,
    pub reason: String,
}

impl FatalError {
    pub fn new(subject: impl Into<String>, err: &dyn Error) -> Self {
        Self {
            subject: subject.into(),
            reason: error_chain(err),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub routes_discovered: usize,
    pub malformed_endpoints: usize,
    pub skipped_routes: Vec<SkippedRoute>,
    pub concrete_uris: usize,
    pub successes: usize,
    pub warnings: Vec<StatusWarning>,
    pub fatal: Vec<FatalError>,
    /// URIs never requested because the run was cancelled.
    pub not_started: usize,
}

impl RunSummary {
    /// A run succeeds when nothing fatal happened and every expected route
    /// resolved to files.
    pub fn is_success(&self) -> bool {
        self.fatal.is_empty() && self.skipped_routes.is_empty() && self.not_started == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    /// Print the summary using the standard log format.
    ///
    /// ```text
    /// [summary] 4 routes, 12 uris: 11 ok, 1 warning, 0 fatal
    /// [warn] /about answered 404
    /// ```
    pub fn print(&self) {
        for skipped in &self.skipped_routes {
            log!("skipped"; "{}: {}", skipped.route, skipped.reason);
        }
        for warning in &self.warnings {
            log!("warn"; "{} answered {}", warning.uri, warning.status);
        }
        for fatal in &self.fatal {
            log!("error"; "{}: {}", fatal.subject, fatal.reason);
        }

        let fatal = format!("{} fatal", self.fatal.len());
        let fatal = if self.fatal.is_empty() {
            fatal.dimmed().to_string()
        } else {
            fatal.red().bold().to_string()
        };

        log!("summary"; "{}, {}: {} ok, {}, {}",
            plural_count(self.routes_discovered, "route"),
            plural_count(self.concrete_uris, "uri"),
            self.successes,
            plural_count(self.warnings.len(), "warning"),
            fatal);

        self.print_discovery_notes();
        if self.not_started > 0 {
            log!("summary"; "{} not requested (cancelled)", plural_count(self.not_started, "uri"));
        }
    }

    /// Print discovery and expansion counts only, for listing without fetching.
    pub fn print_plan(&self) {
        log!("summary"; "{}, {}",
            plural_count(self.routes_discovered, "route"),
            plural_count(self.concrete_uris, "uri"));
        self.print_discovery_notes();
    }

    fn print_discovery_notes(&self) {
        if self.malformed_endpoints > 0 {
            log!("summary"; "{} malformed endpoint{} ignored",
                self.malformed_endpoints, plural_s(self.malformed_endpoints));
        }
        if !self.skipped_routes.is_empty() {
            log!("summary"; "{} not expanded", plural_count(self.skipped_routes.len(), "route"));
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ConfigurationError, ProviderError};

    #[test]
    fn test_success_requires_no_fatal_and_no_skips() {
        let mut summary = RunSummary {
            routes_discovered: 1,
            concrete_uris: 1,
            successes: 1,
            ..Default::default()
        };
        assert!(summary.is_success());
        assert_eq!(summary.exit_code(), 0);

        summary.warnings.push(StatusWarning {
            uri: "/about".into(),
            status: 404,
        });
        assert!(summary.is_success());

        summary.skipped_routes.push(SkippedRoute {
            route: "user".into(),
            reason: "boom".into(),
        });
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_cancelled_run_fails() {
        let summary = RunSummary {
            not_started: 3,
            ..Default::default()
        };
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = ConfigurationError::Provider {
            provider: "users".into(),
            method: "ids".into(),
            source: ProviderError::UnknownMethod("ids".into()),
        };
        let chain = error_chain(&err);
        assert!(chain.starts_with("provider `users` failed"));
        assert!(chain.ends_with("no binding list for method `ids`"));
    }
}
