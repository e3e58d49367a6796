//! `[providers.<name>]` tables: where binding lists come from.
//!
//! ```toml
//! [providers.users]
//! kind = "file"
//! path = "data/users.json"          # { "userIds": [{ "id": "1" }] }
//!
//! [providers.posts]
//! kind = "command"
//! command = ["node", "scripts/posts.js"]   # method key appended
//!
//! [providers.default]
//! kind = "inline"
//! methods = { tags = [{ tag = "rust" }, { tag = "web" }] }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

const PROVIDERS: FieldPath = FieldPath::new("providers");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    File {
        path: PathBuf,
    },
    Command {
        command: Vec<String>,
    },
    Inline {
        #[serde(default)]
        methods: BTreeMap<String, serde_json::Value>,
    },
}

impl ProviderConfig {
    pub fn validate(&self, name: &str, diag: &mut ConfigDiagnostics) {
        match self {
            Self::File { path } if path.as_os_str().is_empty() => {
                diag.error(PROVIDERS, format!("`{name}`: `path` must not be empty"));
            }
            Self::File { path } if !path.exists() => {
                diag.warn(PROVIDERS, format!("`{name}`: `{}` not found", path.display()));
            }
            Self::Command { command } if command.first().is_none_or(|p| p.is_empty()) => {
                diag.error_with_hint(
                    PROVIDERS,
                    format!("`{name}`: `command` must name a program"),
                    "e.g. command = [\"node\", \"scripts/ids.js\"]",
                );
            }
            Self::Inline { methods } => {
                for (method, list) in methods {
                    if !list.is_array() {
                        diag.error(
                            PROVIDERS,
                            format!("`{name}.methods.{method}` must be an array of tables"),
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_parse_all_kinds() {
        let config = test_parse_config(
            r#"
[providers.users]
kind = "file"
path = "users.json"

[providers.posts]
kind = "command"
command = ["node", "posts.js"]

[providers.default]
kind = "inline"
methods = { tags = [{ tag = "rust" }] }
"#,
        );
        assert_eq!(config.providers.len(), 3);
        assert!(matches!(config.providers["users"], ProviderConfig::File { .. }));
        assert!(matches!(
            config.providers["posts"],
            ProviderConfig::Command { ref command } if command.len() == 2
        ));
        let ProviderConfig::Inline { methods } = &config.providers["default"] else {
            panic!("expected inline provider");
        };
        assert!(methods["tags"].is_array());
    }

    #[test]
    fn test_missing_kind_fields_rejected() {
        let result: Result<ProviderConfig, _> = toml::from_str("kind = \"file\"");
        assert!(result.is_err());
        let result: Result<ProviderConfig, _> = toml::from_str("kind = \"sql\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_command() {
        let provider = ProviderConfig::Command { command: vec![] };
        let mut diag = ConfigDiagnostics::new();
        provider.validate("posts", &mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_validate_inline_shape() {
        let provider = ProviderConfig::Inline {
            methods: BTreeMap::from([("tags".to_string(), serde_json::json!({ "tag": "x" }))]),
        };
        let mut diag = ConfigDiagnostics::new();
        provider.validate("default", &mut diag);
        assert!(diag.has_errors());
    }
}
