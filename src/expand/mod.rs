//! Variable expansion: route descriptors to concrete URIs.
//!
//! ```text
//! /user/{id}  + users.userIds() = [{id:1}, {id:2}]  ──►  /user/1, /user/2
//! /about                                              ──►  /about
//! ```
//!
//! Bindings are requested only for templated routes. A route whose provider
//! fails, or whose bindings do not cover its placeholders, produces no URI at
//! all and is reported as skipped.

mod provider;
mod source;

use thiserror::Error;

use crate::core::{ConfigurationError, ExpansionError, SkippedRoute, error_chain};
use crate::route::{ConcreteUri, OptIn, RouteDescriptor};
use crate::{debug, log};

pub use provider::{ProviderRegistry, VariableProvider};
pub use source::{
    CommandProvider, FileProvider, InlineProvider, decode_bindings, providers_from_config,
};

/// Why a single route could not be expanded.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),
}

/// Concrete URIs of every route that expanded, plus the routes that did not.
#[derive(Debug, Default)]
pub struct Expansion {
    /// In catalog order, bindings in provider order within a route.
    pub uris: Vec<ConcreteUri>,
    pub skipped: Vec<SkippedRoute>,
}

/// Expand every descriptor. Per-route failures are contained and reported.
pub fn expand_routes(routes: &[RouteDescriptor], providers: &ProviderRegistry) -> Expansion {
    let mut expansion = Expansion::default();

    for route in routes {
        match expand_route(route, providers) {
            Ok(uris) => {
                if uris.is_empty() {
                    log!("expand"; "{} has no bindings, nothing to generate", route.pattern);
                }
                expansion.uris.extend(uris);
            }
            Err(err) => {
                let reason = error_chain(&err);
                log!("warn"; "skipping {} ({}): {}", route.handler, route.pattern, reason);
                expansion.skipped.push(SkippedRoute {
                    route: format!("{} ({})", route.handler, route.pattern),
                    reason,
                });
            }
        }
    }

    expansion
}

/// Expand one descriptor into its concrete URIs.
///
/// All-or-nothing: the first binding that fails to expand fails the route.
pub fn expand_route(
    route: &RouteDescriptor,
    providers: &ProviderRegistry,
) -> Result<Vec<ConcreteUri>, RouteError> {
    if !route.pattern.is_templated() {
        return Ok(vec![ConcreteUri::new(route.pattern.as_str(), &route.handler)]);
    }

    // Only a method-level marker names a provider
    let Some(provider) = route.provider.as_ref().filter(|_| route.opt_in == OptIn::Method) else {
        return Ok(Vec::new());
    };

    let method_key = route.method_key();
    let bindings = providers.invoke(&provider.component, method_key)?;
    debug!("expand"; "{}.{} -> {} binding(s)", provider.component, method_key, bindings.len());

    bindings
        .iter()
        .enumerate()
        .map(|(index, binding)| {
            route
                .pattern
                .expand(binding, provider.default.as_deref(), index)
                .map(|path| ConcreteUri::new(path, &route.handler))
                .map_err(RouteError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProviderError;
    use crate::route::{ProviderRef, RoutePattern, VariableBinding};

    fn id_binding(id: &str) -> VariableBinding {
        VariableBinding::from([("id".to_string(), id.to_string())])
    }

    fn route(handler: &str, pattern: &str, provider: Option<ProviderRef>) -> RouteDescriptor {
        RouteDescriptor {
            handler: handler.into(),
            pattern: RoutePattern::parse(pattern).unwrap(),
            aliases: vec![],
            methods: vec![],
            opt_in: if provider.is_some() { OptIn::Method } else { OptIn::Group },
            provider,
        }
    }

    fn users_ref(method: Option<&str>) -> Option<ProviderRef> {
        Some(ProviderRef {
            component: "users".into(),
            method: method.map(str::to_string),
            default: None,
        })
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register("users", |method: &str| match method {
            "userIds" => Ok(vec![id_binding("1"), id_binding("2")]),
            "none" => Ok(vec![]),
            "bad" => Ok(vec![id_binding("1"), VariableBinding::new()]),
            other => Err(ProviderError::UnknownMethod(other.to_string())),
        });
        registry
    }

    fn paths(uris: &[ConcreteUri]) -> Vec<&str> {
        uris.iter().map(|u| u.path.as_str()).collect()
    }

    #[test]
    fn test_untemplated_yields_pattern() {
        let uris = expand_route(&route("about", "/about", None), &registry()).unwrap();
        assert_eq!(paths(&uris), ["/about"]);
        assert_eq!(uris[0].route, "about");
    }

    #[test]
    fn test_templated_yields_one_uri_per_binding() {
        let uris =
            expand_route(&route("user", "/user/{id}", users_ref(Some("userIds"))), &registry())
                .unwrap();
        assert_eq!(paths(&uris), ["/user/1", "/user/2"]);
        assert!(uris.iter().all(|u| !u.path.contains('{')));
    }

    #[test]
    fn test_method_key_defaults_to_handler() {
        let uris =
            expand_route(&route("userIds", "/user/{id}", users_ref(None)), &registry()).unwrap();
        assert_eq!(uris.len(), 2);
    }

    #[test]
    fn test_zero_bindings_zero_uris() {
        let uris =
            expand_route(&route("user", "/user/{id}", users_ref(Some("none"))), &registry())
                .unwrap();
        assert!(uris.is_empty());
    }

    #[test]
    fn test_templated_route_without_provider_yields_nothing() {
        let expansion = expand_routes(&[route("user", "/user/{id}", None)], &registry());
        assert!(expansion.uris.is_empty());
        assert!(expansion.skipped.is_empty());
    }

    #[test]
    fn test_one_bad_binding_fails_route() {
        let err = expand_route(&route("user", "/user/{id}", users_ref(Some("bad"))), &registry())
            .unwrap_err();
        assert!(matches!(err, RouteError::Expansion(_)));
    }

    #[test]
    fn test_failures_contained_per_route() {
        let mut unknown = route("user", "/user/{id}", users_ref(Some("userIds")));
        unknown.provider.as_mut().unwrap().component = "missing".into();

        let routes = vec![
            route("home", "/", None),
            unknown,
            route("user", "/user/{id}", users_ref(Some("nope"))),
            route("user", "/u/{id}", users_ref(Some("userIds"))),
        ];

        let expansion = expand_routes(&routes, &registry());
        assert_eq!(paths(&expansion.uris), ["/", "/u/1", "/u/2"]);
        assert_eq!(expansion.skipped.len(), 2);
        assert!(expansion.skipped[0].reason.contains("unknown variable provider"));
        assert!(expansion.skipped[1].reason.contains("no binding list"));
    }
}
