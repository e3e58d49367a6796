//! Host route registry.
//!
//! The registry is owned by the host application and read once per run.
//! `ManifestRegistry` reads the TOML export of it:
//!
//! ```toml
//! [[group]]
//! name = "PageController"
//! all_get_without_variables = true
//!
//! [[endpoint]]
//! handler = "about"
//! group = "PageController"
//! patterns = ["/about"]
//!
//! [[endpoint]]
//! handler = "user"
//! patterns = ["/user/{id}"]
//! methods = ["GET"]
//! ssg = { provider = "users", method = "userIds" }
//!
//! [[mapping]]
//! path = "/login"
//! ```
//!
//! Each entry is decoded on its own, so one malformed entry never hides the
//! rest of the registry.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::core::HttpMethod;
use crate::debug;

/// Read-only view of the host's endpoints, in discovery order.
pub trait RouteRegistry {
    fn entries(&self) -> Vec<RegistryEntry>;
}

/// One registry entry; malformed entries are reported, not dropped.
pub type RegistryEntry = Result<EndpointMeta, MalformedEndpoint>;

impl RouteRegistry for Vec<RegistryEntry> {
    fn entries(&self) -> Vec<RegistryEntry> {
        self.clone()
    }
}

/// Method-level opt-in marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsgMarker {
    /// Variable provider component name.
    pub provider: Option<String>,
    /// Method key override.
    pub method: Option<String>,
    /// Fallback value for unbound placeholders.
    pub default: Option<String>,
}

/// Enclosing group of endpoints (a controller).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupMeta {
    pub name: String,
    /// Opt in every GET endpoint of the group that has no path variables.
    #[serde(default)]
    pub all_get_without_variables: bool,
}

/// Endpoint metadata as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMeta {
    pub handler: String,
    pub group: Option<String>,
    /// Whether the enclosing group carries the group-level opt-in.
    pub group_opt_in: bool,
    /// Raw patterns, first-registered first.
    pub patterns: Vec<String>,
    pub methods: Vec<HttpMethod>,
    pub ssg: Option<SsgMarker>,
}

/// An entry that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEndpoint {
    /// Human-readable position, e.g. `endpoint[3]`.
    pub entry: String,
    pub reason: String,
}

// ============================================================================
// TOML manifest
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpoint {
    handler: String,
    #[serde(default)]
    group: Option<String>,
    patterns: Vec<String>,
    #[serde(default)]
    methods: Vec<String>,
    #[serde(default)]
    ssg: Option<SsgMarker>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMapping {
    path: String,
}

/// Registry backed by a TOML export of the host's route table.
#[derive(Debug, Default)]
pub struct ManifestRegistry {
    entries: Vec<RegistryEntry>,
}

impl ManifestRegistry {
    /// Load a manifest file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Parse manifest content. Only the top-level TOML syntax can fail here.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;

        let mut entries = Vec::new();
        let groups = decode_groups(table.remove("group"), &mut entries);

        for (i, value) in take_array(table.remove("endpoint")).into_iter().enumerate() {
            let entry = format!("endpoint[{i}]");
            entries.push(
                value
                    .try_into::<RawEndpoint>()
                    .map_err(|err| malformed(&entry, err.message()))
                    .and_then(|raw| endpoint_from_raw(&entry, raw, &groups)),
            );
        }

        for (i, value) in take_array(table.remove("mapping")).into_iter().enumerate() {
            let entry = format!("mapping[{i}]");
            match value.try_into::<RawMapping>() {
                Ok(raw) if is_enumerable_mapping(&raw.path) => {
                    entries.push(Ok(endpoint_from_mapping(raw.path)));
                }
                Ok(raw) => debug!("catalog"; "ignoring mapping `{}`", raw.path),
                Err(err) => entries.push(Err(malformed(&entry, err.message()))),
            }
        }

        for key in table.keys() {
            entries.push(Err(malformed(key, "unknown top-level key")));
        }

        Ok(Self { entries })
    }
}

impl RouteRegistry for ManifestRegistry {
    fn entries(&self) -> Vec<RegistryEntry> {
        self.entries.clone()
    }
}

fn malformed(entry: &str, reason: impl Into<String>) -> MalformedEndpoint {
    MalformedEndpoint {
        entry: entry.to_string(),
        reason: reason.into(),
    }
}

fn take_array(value: Option<toml::Value>) -> Vec<toml::Value> {
    match value {
        Some(toml::Value::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

/// Decode `[[group]]` entries; malformed groups are reported as entries.
fn decode_groups(
    value: Option<toml::Value>,
    entries: &mut Vec<RegistryEntry>,
) -> FxHashMap<String, GroupMeta> {
    let mut groups = FxHashMap::default();
    for (i, value) in take_array(value).into_iter().enumerate() {
        match value.try_into::<GroupMeta>() {
            Ok(group) => {
                groups.insert(group.name.clone(), group);
            }
            Err(err) => entries.push(Err(malformed(&format!("group[{i}]"), err.message()))),
        }
    }
    groups
}

fn endpoint_from_raw(
    entry: &str,
    raw: RawEndpoint,
    groups: &FxHashMap<String, GroupMeta>,
) -> Result<EndpointMeta, MalformedEndpoint> {
    if raw.handler.trim().is_empty() {
        return Err(malformed(entry, "empty handler name"));
    }
    if raw.patterns.is_empty() {
        return Err(malformed(entry, "no path patterns"));
    }

    let methods = raw
        .methods
        .iter()
        .map(|m| m.parse::<HttpMethod>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| malformed(entry, reason))?;

    let group_opt_in = raw
        .group
        .as_ref()
        .and_then(|name| groups.get(name))
        .is_some_and(|g| g.all_get_without_variables);

    Ok(EndpointMeta {
        handler: raw.handler,
        group: raw.group,
        group_opt_in,
        patterns: raw.patterns,
        methods,
        ssg: raw.ssg,
    })
}

/// Simple URL mappings are exported unless they name a directory or a glob.
fn is_enumerable_mapping(path: &str) -> bool {
    !path.ends_with('/') && !path.contains('*')
}

fn endpoint_from_mapping(path: String) -> EndpointMeta {
    EndpointMeta {
        handler: path.clone(),
        group: None,
        group_opt_in: false,
        patterns: vec![path],
        methods: Vec::new(),
        ssg: Some(SsgMarker::default()),
    }
}
