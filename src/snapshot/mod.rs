//! Snapshot fetcher: one GET per concrete URI against the live instance.
//!
//! ```text
//!            ┌──────────── rayon pool (live.concurrency) ────────────┐
//! uris ───►  │ check cancel → GET → classify → sink(write) → progress │ ──► FetchReport
//!            └────────────────────────────────────────────────────────┘
//! ```
//!
//! - 2xx: body captured verbatim
//! - other status: body still captured and written, reported as a warning
//! - transport failure: fatal; with `abort` it trips the run's cancellation
//!   so no new requests start while in-flight ones drain

#[cfg(test)]
pub mod testing;

use std::time::Duration;

use anyhow::{Context, Result};
use rayon::prelude::*;
use reqwest::blocking::Client;
use url::Url;

use crate::config::{LiveConfig, TransportPolicy};
use crate::core::{Cancellation, FatalError, FetchError, StatusWarning, WriteError};
use crate::debug;
use crate::logger::{ProgressLine, is_quiet};
use crate::route::ConcreteUri;

/// Captured response for one concrete URI.
#[derive(Debug)]
pub struct SnapshotResult {
    pub uri: ConcreteUri,
    /// `None` when no response was received.
    pub status: Option<u16>,
    pub body: Vec<u8>,
    pub error: Option<FetchError>,
}

impl SnapshotResult {
    fn failed(uri: ConcreteUri, error: FetchError) -> Self {
        Self {
            uri,
            status: None,
            body: Vec::new(),
            error: Some(error),
        }
    }
}

/// Per-URI result of the fetch-and-write phase.
#[derive(Debug)]
enum Outcome {
    Written,
    Warned(StatusWarning),
    Fatal(FatalError),
    NotStarted,
}

/// Aggregated outcome of a snapshot run, in input order.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub successes: usize,
    pub warnings: Vec<StatusWarning>,
    pub fatal: Vec<FatalError>,
    pub not_started: usize,
}

pub struct SnapshotFetcher {
    client: Client,
    base: Url,
    pool: rayon::ThreadPool,
    policy: TransportPolicy,
    cancel: Cancellation,
}

impl SnapshotFetcher {
    pub fn new(live: &LiveConfig, cancel: Cancellation) -> Result<Self> {
        let base = Url::parse(&live.base_url())
            .with_context(|| format!("invalid live server address `{}`", live.base_url()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(live.timeout))
            .build()
            .context("failed to build HTTP client")?;

        // 0 lets rayon pick one thread per CPU
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(live.concurrency)
            .thread_name(|i| format!("snapshot-{i}"))
            .build()
            .context("failed to create snapshot worker pool")?;

        Ok(Self {
            client,
            base,
            pool,
            policy: live.on_transport_error,
            cancel,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET one URI. Never panics; every failure lands in `error`.
    pub fn fetch(&self, uri: &ConcreteUri) -> SnapshotResult {
        let url = match self.base.join(&uri.path) {
            Ok(url) => url,
            Err(source) => {
                let error = FetchError::Url {
                    uri: uri.path.clone(),
                    source,
                };
                return SnapshotResult::failed(uri.clone(), error);
            }
        };

        let response = self.client.get(url).send().and_then(|resp| {
            let status = resp.status().as_u16();
            resp.bytes().map(|body| (status, body.to_vec()))
        });

        match response {
            Ok((status, body)) => {
                let error = (!(200..300).contains(&status)).then(|| FetchError::Status {
                    uri: uri.path.clone(),
                    status,
                });
                SnapshotResult {
                    uri: uri.clone(),
                    status: Some(status),
                    body,
                    error,
                }
            }
            Err(source) => {
                let error = FetchError::Transport {
                    uri: uri.path.clone(),
                    source,
                };
                SnapshotResult::failed(uri.clone(), error)
            }
        }
    }

    /// Fetch every URI on the pool and hand each captured response to `sink`.
    ///
    /// `sink` receives the URI's index in `uris`. A sink error is fatal for
    /// that URI and, under `abort`, for the rest of the run.
    pub fn run<F>(&self, uris: &[ConcreteUri], sink: F) -> FetchReport
    where
        F: Fn(usize, SnapshotResult) -> Result<(), WriteError> + Sync,
    {
        let progress = (!is_quiet() && !uris.is_empty())
            .then(|| ProgressLine::new("snapshot", &[("pages", uris.len())]));

        let outcomes: Vec<Outcome> = self.pool.install(|| {
            uris.par_iter()
                .enumerate()
                .map(|(index, uri)| {
                    if self.cancel.is_cancelled() {
                        return Outcome::NotStarted;
                    }
                    let outcome = self.settle(index, self.fetch(uri), &sink);
                    let fatal = matches!(outcome, Outcome::Fatal(_));
                    if fatal && self.policy == TransportPolicy::Abort {
                        self.cancel.cancel();
                    }
                    if let Some(progress) = &progress {
                        progress.inc("pages");
                    }
                    outcome
                })
                .collect()
        });

        if let Some(progress) = progress {
            progress.finish();
        }

        let mut report = FetchReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Written => report.successes += 1,
                Outcome::Warned(warning) => report.warnings.push(warning),
                Outcome::Fatal(fatal) => report.fatal.push(fatal),
                Outcome::NotStarted => report.not_started += 1,
            }
        }
        report
    }

    fn settle<F>(&self, index: usize, result: SnapshotResult, sink: &F) -> Outcome
    where
        F: Fn(usize, SnapshotResult) -> Result<(), WriteError>,
    {
        let uri = result.uri.path.clone();
        let status = result.status;

        if let Some(err) = &result.error
            && err.is_fatal()
        {
            return Outcome::Fatal(FatalError::new(uri, err));
        }

        if let Err(err) = sink(index, result) {
            return Outcome::Fatal(FatalError::new(uri, &err));
        }

        match status {
            Some(status) if !(200..300).contains(&status) => {
                debug!("snapshot"; "{} answered {}", uri, status);
                Outcome::Warned(StatusWarning { uri, status })
            }
            _ => Outcome::Written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use testing::{LiveServer, unused_port};

    fn live(port: u16, policy: TransportPolicy) -> LiveConfig {
        LiveConfig {
            port,
            concurrency: 2,
            timeout: 5,
            on_transport_error: policy,
            ..Default::default()
        }
    }

    fn fetcher_for(port: u16, policy: TransportPolicy) -> SnapshotFetcher {
        SnapshotFetcher::new(&live(port, policy), Cancellation::new()).unwrap()
    }

    fn uris(paths: &[&str]) -> Vec<ConcreteUri> {
        paths.iter().map(|p| ConcreteUri::new(*p, "h")).collect()
    }

    fn site(path: &str) -> (u16, String) {
        match path {
            "/" => (200, "home".into()),
            "/about" => (404, "not found".into()),
            p if p.starts_with("/user/") => (200, format!("user {}", &p[6..])),
            _ => (500, "boom".into()),
        }
    }

    #[test]
    fn test_fetch_captures_status_and_body() {
        let server = LiveServer::start(site);
        let fetcher = fetcher_for(server.port(), TransportPolicy::Abort);

        let ok = fetcher.fetch(&ConcreteUri::new("/user/7", "user"));
        assert_eq!(ok.status, Some(200));
        assert_eq!(ok.body, b"user 7");
        assert!(ok.error.is_none());

        let missing = fetcher.fetch(&ConcreteUri::new("/about", "about"));
        assert_eq!(missing.status, Some(404));
        assert_eq!(missing.body, b"not found");
        assert!(matches!(missing.error, Some(FetchError::Status { status: 404, .. })));
    }

    #[test]
    fn test_every_request_is_get() {
        let server = LiveServer::start(site);
        let fetcher = fetcher_for(server.port(), TransportPolicy::Abort);
        fetcher.run(&uris(&["/", "/user/1"]), |_, _| Ok(()));
        assert!(server.methods().iter().all(|m| m == "GET"));
        assert_eq!(server.methods().len(), 2);
    }

    #[test]
    fn test_run_reports_warnings_in_order() {
        let server = LiveServer::start(site);
        let fetcher = fetcher_for(server.port(), TransportPolicy::Abort);
        let written = Mutex::new(Vec::new());

        let report = fetcher.run(&uris(&["/", "/about", "/user/1", "/x"]), |i, result| {
            written.lock().push((i, result.body));
            Ok(())
        });

        assert_eq!(report.successes, 2);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].uri, "/about");
        assert_eq!(report.warnings[1].status, 500);
        assert!(report.fatal.is_empty());
        assert_eq!(written.lock().len(), 4);
    }

    #[test]
    fn test_transport_failure_is_fatal() {
        let fetcher = fetcher_for(unused_port(), TransportPolicy::Collect);
        let report = fetcher.run(&uris(&["/a", "/b", "/c"]), |_, _| Ok(()));
        assert_eq!(report.fatal.len(), 3);
        assert_eq!(report.not_started, 0);
        assert!(report.fatal[0].reason.contains("request to `/a` failed"));
    }

    #[test]
    fn test_abort_stops_new_requests() {
        let cancel = Cancellation::new();
        let mut config = live(unused_port(), TransportPolicy::Abort);
        config.concurrency = 1;
        let fetcher = SnapshotFetcher::new(&config, cancel.clone()).unwrap();

        let report = fetcher.run(&uris(&["/a", "/b", "/c", "/d"]), |_, _| Ok(()));
        assert!(cancel.is_cancelled());
        assert!(!report.fatal.is_empty());
        assert_eq!(report.fatal.len() + report.not_started, 4);
        assert!(report.not_started > 0);
    }

    #[test]
    fn test_cancelled_run_issues_nothing() {
        let server = LiveServer::start(site);
        let cancel = Cancellation::new();
        cancel.cancel();
        let config = live(server.port(), TransportPolicy::Abort);
        let fetcher = SnapshotFetcher::new(&config, cancel).unwrap();

        let report = fetcher.run(&uris(&["/", "/user/1"]), |_, _| Ok(()));
        assert_eq!(report.not_started, 2);
        assert!(server.methods().is_empty());
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let server = LiveServer::start(site);
        let fetcher = fetcher_for(server.port(), TransportPolicy::Collect);

        let report = fetcher.run(&uris(&["/"]), |_, _| {
            Err(WriteError::UnsafePath("/".into()))
        });
        assert_eq!(report.fatal.len(), 1);
        assert_eq!(report.successes, 0);
    }
}
