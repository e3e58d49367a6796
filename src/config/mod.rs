//! Project configuration management for `snapsite.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One file per section
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file lookup
//! └── mod.rs         # SnapConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section              | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | `[output]`           | Distribution root and file naming              |
//! | `[live]`             | Running instance to snapshot, pool, policy     |
//! | `[routes]`           | Exported route registry                        |
//! | `[[assets]]`         | Static resource trees copied before snapshots  |
//! | `[providers.<name>]` | Variable providers for templated routes        |
//! | `[preview]`          | Local static preview server                    |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    AssetMount, LiveConfig, OutputConfig, PreviewConfig, ProviderConfig, RoutesConfig,
    TransportPolicy,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{Cli, Commands, LiveArgs};
use crate::log;
use crate::utils::path::normalize_path;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing snapsite.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub output: OutputConfig,

    pub live: LiveConfig,

    pub routes: RoutesConfig,

    pub assets: Vec<AssetMount>,

    pub providers: BTreeMap<String, ProviderConfig>,

    pub preview: PreviewConfig,
}

impl SnapConfig {
    /// Load configuration for the parsed command line.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(ConfigError::Validation(format!(
                "config file `{}` not found in this directory or any parent",
                cli.config.display()
            )));
        };

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.finalize(&root, cli);
        config.validate()?;

        Ok(config)
    }

    /// Resolve paths and apply command line overrides.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        Self::update_option(&mut self.output.dir, cli.output.as_ref());
        Self::update_option(&mut self.output.html_extension, cli.html_extension.as_ref());
        self.normalize_paths(root);
        self.apply_command_options(cli);
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Generate { live } => self.apply_live_args(live),
            Commands::Routes { .. } => {}
            Commands::Preview { interface, port } => {
                Self::update_option(&mut self.preview.interface, interface.as_ref());
                Self::update_option(&mut self.preview.port, port.as_ref());
            }
        }
    }

    fn apply_live_args(&mut self, args: &LiveArgs) {
        Self::update_option(&mut self.live.host, args.host.as_ref());
        Self::update_option(&mut self.live.port, args.port.as_ref());
        Self::update_option(&mut self.live.concurrency, args.concurrency.as_ref());
        if args.collect_failures {
            self.live.on_transport_error = TransportPolicy::Collect;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.set_root(&root);

        self.output.dir = normalize_path(&root.join(&self.output.dir));
        self.routes.manifest = normalize_path(&root.join(&self.routes.manifest));
        for asset in &mut self.assets {
            asset.dir = normalize_path(&root.join(&asset.dir));
        }
        for provider in self.providers.values_mut() {
            if let ProviderConfig::File { path } = provider
                && !path.as_os_str().is_empty()
            {
                *path = normalize_path(&root.join(&*path));
            }
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole configuration, reporting every error at once.
    pub fn validate(&self) -> Result<()> {
        let diag = self.diagnostics();
        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn diagnostics(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        self.output.validate(&self.root, &mut diag);
        self.live.validate(&mut diag);
        for (idx, asset) in self.assets.iter().enumerate() {
            asset.validate(idx, &self.output.dir, &mut diag);
        }
        for (name, provider) in &self.providers {
            provider.validate(name, &mut diag);
        }

        diag
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SnapConfig {
    let (parsed, ignored) = SnapConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with every path resolved, as `load` produces.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> SnapConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("snapsite.toml");
    config.normalize_paths(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SnapConfig::from_str("[output\ndir = \"dist\"").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = SnapConfig::default();
        assert_eq!(config.get_root(), Path::new(""));
        assert_eq!(config.routes.manifest, PathBuf::from("routes.toml"));
        assert!(config.assets.is_empty());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[output]\ndir = \"out\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SnapConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        let config = test_config_at(
            &root,
            r#"
[[assets]]
prefix = "/static/**"
dir = "static"

[providers.users]
kind = "file"
path = "data/users.json"
"#,
        );

        assert_eq!(config.get_root(), root);
        assert_eq!(config.output.dir, root.join("dist"));
        assert_eq!(config.routes.manifest, root.join("routes.toml"));
        assert_eq!(config.assets[0].dir, root.join("static"));
        assert_eq!(
            config.providers["users"],
            ProviderConfig::File {
                path: root.join("data/users.json")
            }
        );
        assert_eq!(config.root_relative(root.join("dist/a")), PathBuf::from("dist/a"));
    }

    #[test]
    fn test_cli_overrides() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        let cli = Cli::parse_from([
            "snapsite",
            "--output",
            "public",
            "--html-extension=false",
            "generate",
            "--port",
            "9090",
            "--concurrency",
            "2",
            "--collect-failures",
        ]);

        let mut config = test_parse_config("[live]\nport = 8080");
        config.finalize(&root, &cli);

        assert_eq!(config.output.dir, root.join("public"));
        assert!(!config.output.html_extension);
        assert_eq!(config.live.port, 9090);
        assert_eq!(config.live.concurrency, 2);
        assert_eq!(config.live.on_transport_error, TransportPolicy::Collect);
    }

    #[test]
    fn test_validate_collects_every_error() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        let config = test_config_at(
            &root,
            r#"
[output]
dir = "."

[live]
port = 0

[providers.p]
kind = "command"
command = []
"#,
        );

        let diag = config.diagnostics();
        assert_eq!(diag.errors().len(), 3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        let dir = TempDir::new().unwrap();
        let root = normalize_path(dir.path());
        let config = test_config_at(&root, "");
        assert!(config.validate().is_ok());
    }
}
