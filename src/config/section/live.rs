//! `[live]` section configuration.
//!
//! Describes the running instance whose responses are captured.
//!
//! ```toml
//! [live]
//! host = "127.0.0.1"
//! port = 8080
//! concurrency = 8               # 0 = one worker per CPU
//! timeout = 30                  # seconds per request
//! on_transport_error = "abort"  # or "collect"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

const HOST: FieldPath = FieldPath::new("live.host");
const PORT: FieldPath = FieldPath::new("live.port");
const TIMEOUT: FieldPath = FieldPath::new("live.timeout");

/// What a transport failure does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportPolicy {
    /// Stop issuing requests after the first failure; in-flight ones drain.
    #[default]
    Abort,
    /// Keep going and report every failure at the end.
    Collect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub host: String,
    pub port: u16,
    /// Worker pool bound.
    pub concurrency: usize,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub on_transport_error: TransportPolicy,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            concurrency: 8,
            timeout: 30,
            on_transport_error: TransportPolicy::Abort,
        }
    }
}

impl LiveConfig {
    /// Base URL of the live instance, e.g. `http://127.0.0.1:8080`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.host.trim().is_empty() {
            diag.error(HOST, "host must not be empty");
        }
        if self.port == 0 {
            diag.error_with_hint(PORT, "port must be non-zero", "set the live server's HTTP port");
        }
        if self.timeout == 0 {
            diag.error(TIMEOUT, "timeout must be at least one second");
        }
        if url::Url::parse(&self.base_url()).is_err() {
            diag.error(HOST, format!("`{}` is not a valid host", self.host));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.live.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.live.concurrency, 8);
        assert_eq!(config.live.timeout, 30);
        assert_eq!(config.live.on_transport_error, TransportPolicy::Abort);
    }

    #[test]
    fn test_collect_policy() {
        let config = test_parse_config(
            r#"
[live]
host = "localhost"
port = 3000
concurrency = 0
on_transport_error = "collect"
"#,
        );
        assert_eq!(config.live.base_url(), "http://localhost:3000");
        assert_eq!(config.live.concurrency, 0);
        assert_eq!(config.live.on_transport_error, TransportPolicy::Collect);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<LiveConfig, _> = toml::from_str("on_transport_error = \"ignore\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_values() {
        let live = LiveConfig {
            port: 0,
            timeout: 0,
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        live.validate(&mut diag);
        assert_eq!(diag.errors().len(), 2);
    }
}
