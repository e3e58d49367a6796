//! Route enumeration: registry input, descriptors, and the catalog filter.
//!
//! ```text
//! RouteRegistry (host)  ──►  build_catalog  ──►  Vec<RouteDescriptor>
//!   EndpointMeta              opt-in + GET         immutable, discovery order
//! ```

mod catalog;
mod pattern;
mod registry;

use std::collections::BTreeMap;

use crate::core::HttpMethod;

pub use catalog::{Catalog, build_catalog};
pub use pattern::{Placeholder, RoutePattern};
pub use registry::{
    EndpointMeta, GroupMeta, ManifestRegistry, MalformedEndpoint, RegistryEntry, RouteRegistry,
    SsgMarker,
};

/// Placeholder name → literal value for one expansion of a route.
pub type VariableBinding = BTreeMap<String, String>;

/// Provider name used when an endpoint opts in without naming one.
pub const DEFAULT_PROVIDER: &str = "default";

/// How a route was opted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptIn {
    /// Marked on the endpoint itself.
    Method,
    /// Covered by its group's "all GET endpoints without path variables".
    Group,
}

/// Where a templated route gets its bindings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRef {
    /// Provider component name in the `[providers]` table.
    pub component: String,
    /// Explicit method key; falls back to the endpoint's handler name.
    pub method: Option<String>,
    /// Value for placeholders a binding does not cover.
    pub default: Option<String>,
}

/// Normalized record of one servable route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// Handler name of the endpoint (default method key).
    pub handler: String,
    /// First registered pattern; decides the concrete URIs.
    pub pattern: RoutePattern,
    /// Additional patterns registered on the same endpoint.
    pub aliases: Vec<String>,
    /// Allowed methods (empty = any).
    pub methods: Vec<HttpMethod>,
    pub opt_in: OptIn,
    pub provider: Option<ProviderRef>,
}

impl RouteDescriptor {
    /// Method key the provider is invoked with.
    pub fn method_key(&self) -> &str {
        self.provider
            .as_ref()
            .and_then(|p| p.method.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.handler)
    }
}

/// A path with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteUri {
    pub path: String,
    /// Handler of the route this URI was expanded from.
    pub route: String,
}

impl ConcreteUri {
    pub fn new(path: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            route: route.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(handler: &str, provider: Option<ProviderRef>) -> RouteDescriptor {
        RouteDescriptor {
            handler: handler.into(),
            pattern: RoutePattern::parse("/user/{id}").unwrap(),
            aliases: vec![],
            methods: vec![],
            opt_in: OptIn::Method,
            provider,
        }
    }

    #[test]
    fn test_method_key_defaults_to_handler() {
        let route = descriptor("user", None);
        assert_eq!(route.method_key(), "user");

        let route = descriptor(
            "user",
            Some(ProviderRef {
                component: "users".into(),
                method: Some(String::new()),
                default: None,
            }),
        );
        assert_eq!(route.method_key(), "user");
    }

    #[test]
    fn test_method_key_override() {
        let route = descriptor(
            "user",
            Some(ProviderRef {
                component: "users".into(),
                method: Some("userIds".into()),
                default: None,
            }),
        );
        assert_eq!(route.method_key(), "userIds");
    }
}
