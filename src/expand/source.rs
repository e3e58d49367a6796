//! Built-in variable providers.
//!
//! | kind      | bindings come from                                         |
//! |-----------|------------------------------------------------------------|
//! | `file`    | JSON/TOML document: `{ methodKey = [ { id = "1" }, ... ] }` |
//! | `command` | stdout (JSON array) of `command... methodKey`               |
//! | `inline`  | `[providers.<name>.methods]` table in `snapsite.toml`       |
//!
//! Binding values may be strings, numbers or booleans; anything else is
//! rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{ProviderConfig, SnapConfig};
use crate::core::ProviderError;
use crate::route::VariableBinding;
use crate::utils::exec::Cmd;

use super::{ProviderRegistry, VariableProvider};

/// Build the lookup table from the `[providers]` section.
pub fn providers_from_config(config: &SnapConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for (name, provider) in &config.providers {
        match provider {
            ProviderConfig::File { path } => {
                registry.register(name.clone(), FileProvider::new(path.clone()));
            }
            ProviderConfig::Command { command } => {
                registry.register(
                    name.clone(),
                    CommandProvider::new(command.clone(), config.get_root()),
                );
            }
            ProviderConfig::Inline { methods } => {
                registry.register(name.clone(), InlineProvider::new(methods.clone()));
            }
        }
    }
    registry
}

// ============================================================================
// File
// ============================================================================

/// Reads a binding document on every invocation.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Value, ProviderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|err| ProviderError::Io(self.path.clone(), err))?;

        let is_toml = self.path.extension().is_some_and(|ext| ext == "toml");
        if is_toml {
            let table: toml::Table = toml::from_str(&content)
                .map_err(|err| ProviderError::Invalid(err.message().to_string()))?;
            serde_json::to_value(table).map_err(|err| ProviderError::Invalid(err.to_string()))
        } else {
            serde_json::from_str(&content).map_err(|err| ProviderError::Invalid(err.to_string()))
        }
    }
}

impl VariableProvider for FileProvider {
    fn bindings(&self, method_key: &str) -> Result<Vec<VariableBinding>, ProviderError> {
        let mut document = self.load()?;
        let list = document
            .get_mut(method_key)
            .map(Value::take)
            .ok_or_else(|| ProviderError::UnknownMethod(method_key.to_string()))?;
        decode_bindings(list)
    }
}

// ============================================================================
// Command
// ============================================================================

/// Runs an external command with the method key as its last argument.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    command: Vec<String>,
    cwd: PathBuf,
}

impl CommandProvider {
    pub fn new(command: Vec<String>, cwd: &Path) -> Self {
        Self {
            command,
            cwd: cwd.to_path_buf(),
        }
    }
}

impl VariableProvider for CommandProvider {
    fn bindings(&self, method_key: &str) -> Result<Vec<VariableBinding>, ProviderError> {
        if self.command.is_empty() {
            return Err(ProviderError::Command("empty command".to_string()));
        }

        let output = Cmd::from_slice(&self.command)
            .arg(method_key)
            .cwd(&self.cwd)
            .run()
            .map_err(|err| ProviderError::Command(format!("{err:#}")))?;

        let value: Value = serde_json::from_slice(&output.stdout)
            .map_err(|err| ProviderError::Invalid(format!("command output: {err}")))?;
        decode_bindings(value)
    }
}

// ============================================================================
// Inline
// ============================================================================

/// Binding lists written directly in the configuration.
#[derive(Debug, Clone, Default)]
pub struct InlineProvider {
    methods: BTreeMap<String, Value>,
}

impl InlineProvider {
    pub fn new(methods: BTreeMap<String, Value>) -> Self {
        Self { methods }
    }
}

impl VariableProvider for InlineProvider {
    fn bindings(&self, method_key: &str) -> Result<Vec<VariableBinding>, ProviderError> {
        let list = self
            .methods
            .get(method_key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownMethod(method_key.to_string()))?;
        decode_bindings(list)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode `[{ "id": "1" }, ...]` into bindings, preserving order.
pub fn decode_bindings(value: Value) -> Result<Vec<VariableBinding>, ProviderError> {
    let Value::Array(items) = value else {
        return Err(ProviderError::Invalid("expected an array of objects".into()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Object(map) = item else {
                return Err(ProviderError::Invalid(format!("binding #{i} is not an object")));
            };
            map.into_iter()
                .map(|(key, value)| {
                    scalar_to_string(value)
                        .map(|v| (key.clone(), v))
                        .ok_or_else(|| {
                            ProviderError::Invalid(format!(
                                "binding #{i}: `{key}` must be a string, number or boolean"
                            ))
                        })
                })
                .collect()
        })
        .collect()
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
