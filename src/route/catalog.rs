//! Route catalog: one pass over the registry applying the opt-in policy.
//!
//! Filtering, in order:
//! 1. opted in at method level, or the group opts in all GET endpoints
//!    without path variables (a templated endpoint without its own marker
//!    is not opted in)
//! 2. allowed methods are empty (any) or include GET
//!
//! Malformed entries are skipped with a warning. Discovery order is kept.

use crate::core::HttpMethod;
use crate::route::{
    DEFAULT_PROVIDER, EndpointMeta, MalformedEndpoint, OptIn, ProviderRef, RouteDescriptor,
    RoutePattern, RouteRegistry,
};
use crate::{debug, log};

/// Result of building the catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Routes to snapshot, in discovery order.
    pub routes: Vec<RouteDescriptor>,
    /// Entries that could not be decoded or parsed.
    pub malformed: Vec<MalformedEndpoint>,
    /// Well-formed endpoints left out by the opt-in or method filter.
    pub excluded: usize,
}

/// Build the immutable route list from the host registry.
pub fn build_catalog(registry: &dyn RouteRegistry) -> Catalog {
    let mut catalog = Catalog::default();

    for entry in registry.entries() {
        let meta = match entry {
            Ok(meta) => meta,
            Err(bad) => {
                log!("warn"; "skipping {}: {}", bad.entry, bad.reason);
                catalog.malformed.push(bad);
                continue;
            }
        };

        let Some(opt_in) = opt_in_of(&meta) else {
            debug!("catalog"; "{} not opted in", meta.handler);
            catalog.excluded += 1;
            continue;
        };

        if !HttpMethod::admits_get(&meta.methods) {
            debug!("catalog"; "{} does not accept GET", meta.handler);
            catalog.excluded += 1;
            continue;
        }

        match descriptor_from(meta, opt_in) {
            Ok(route) => {
                if !route.aliases.is_empty() {
                    debug!("catalog"; "{} also matches {}, not generated",
                        route.pattern, route.aliases.join(", "));
                }
                catalog.routes.push(route);
            }
            Err(bad) => {
                log!("warn"; "skipping {}: {}", bad.entry, bad.reason);
                catalog.malformed.push(bad);
            }
        }
    }

    catalog
}

fn opt_in_of(meta: &EndpointMeta) -> Option<OptIn> {
    if meta.ssg.is_some() {
        Some(OptIn::Method)
    } else if meta.group_opt_in && !meta.patterns.iter().any(|p| p.contains('{')) {
        Some(OptIn::Group)
    } else {
        None
    }
}

fn descriptor_from(
    meta: EndpointMeta,
    opt_in: OptIn,
) -> Result<RouteDescriptor, MalformedEndpoint> {
    let malformed = |err: crate::core::PatternError| MalformedEndpoint {
        entry: meta.handler.clone(),
        reason: err.to_string(),
    };

    let mut patterns = meta.patterns.iter();
    let first = patterns.next().ok_or_else(|| MalformedEndpoint {
        entry: meta.handler.clone(),
        reason: "no path patterns".to_string(),
    })?;
    let pattern = RoutePattern::parse(first).map_err(malformed)?;

    let aliases = patterns
        .map(|raw| RoutePattern::parse(raw).map(|p| p.as_str().to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;

    let provider = meta.ssg.as_ref().map(|marker| ProviderRef {
        component: marker
            .provider
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
        method: marker.method.clone(),
        default: marker.default.clone(),
    });

    Ok(RouteDescriptor {
        handler: meta.handler,
        pattern,
        aliases,
        methods: meta.methods,
        opt_in,
        provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RegistryEntry, SsgMarker};

    fn endpoint(handler: &str, patterns: &[&str]) -> EndpointMeta {
        EndpointMeta {
            handler: handler.into(),
            group: None,
            group_opt_in: false,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            methods: vec![],
            ssg: None,
        }
    }

    fn opted(mut meta: EndpointMeta) -> EndpointMeta {
        meta.ssg = Some(SsgMarker::default());
        meta
    }

    #[test]
    fn test_post_only_without_markers_excluded() {
        let mut save = endpoint("save", &["/save"]);
        save.methods = vec![HttpMethod::Post];
        let registry: Vec<RegistryEntry> = vec![Ok(save)];

        let catalog = build_catalog(&registry);
        assert!(catalog.routes.is_empty());
        assert_eq!(catalog.excluded, 1);
    }

    #[test]
    fn test_post_only_with_marker_excluded() {
        let mut save = opted(endpoint("save", &["/save"]));
        save.methods = vec![HttpMethod::Post];
        let registry: Vec<RegistryEntry> = vec![Ok(save)];

        assert!(build_catalog(&registry).routes.is_empty());
    }

    #[test]
    fn test_unmarked_endpoint_excluded() {
        let registry: Vec<RegistryEntry> = vec![Ok(endpoint("about", &["/about"]))];
        assert!(build_catalog(&registry).routes.is_empty());
    }

    #[test]
    fn test_opt_in_sources() {
        let mut grouped = endpoint("about", &["/about"]);
        grouped.group_opt_in = true;
        let mut both = opted(endpoint("home", &["/"]));
        both.group_opt_in = true;
        let registry: Vec<RegistryEntry> = vec![Ok(grouped), Ok(both)];

        let catalog = build_catalog(&registry);
        assert_eq!(catalog.routes.len(), 2);
        assert_eq!(catalog.routes[0].opt_in, OptIn::Group);
        assert!(catalog.routes[0].provider.is_none());
        assert_eq!(catalog.routes[1].opt_in, OptIn::Method);
    }

    #[test]
    fn test_group_opt_in_skips_templated_endpoints() {
        let mut about = endpoint("about", &["/about"]);
        about.group_opt_in = true;
        let mut post = endpoint("post", &["/post/{slug}"]);
        post.group_opt_in = true;
        let mut alias = endpoint("archive", &["/archive", "/archive/{year}"]);
        alias.group_opt_in = true;
        let registry: Vec<RegistryEntry> = vec![Ok(about), Ok(post), Ok(alias)];

        let catalog = build_catalog(&registry);
        let handlers: Vec<_> = catalog.routes.iter().map(|r| r.handler.as_str()).collect();
        assert_eq!(handlers, ["about"]);
        assert_eq!(catalog.excluded, 2);
        assert!(catalog.malformed.is_empty());
    }

    #[test]
    fn test_method_marker_admits_templated_grouped_endpoint() {
        let mut post = opted(endpoint("post", &["/post/{slug}"]));
        post.group_opt_in = true;
        let registry: Vec<RegistryEntry> = vec![Ok(post)];

        let catalog = build_catalog(&registry);
        assert_eq!(catalog.routes.len(), 1);
        assert_eq!(catalog.routes[0].opt_in, OptIn::Method);
    }

    #[test]
    fn test_discovery_order_preserved() {
        let registry: Vec<RegistryEntry> = ["c", "a", "b"]
            .iter()
            .map(|h| Ok(opted(endpoint(h, &[format!("/{h}").as_str()]))))
            .collect();

        let catalog = build_catalog(&registry);
        let handlers: Vec<_> = catalog.routes.iter().map(|r| r.handler.as_str()).collect();
        assert_eq!(handlers, ["c", "a", "b"]);
    }

    #[test]
    fn test_first_pattern_wins() {
        let registry: Vec<RegistryEntry> =
            vec![Ok(opted(endpoint("about", &["/about", "/about-us"])))];

        let catalog = build_catalog(&registry);
        let route = &catalog.routes[0];
        assert_eq!(route.pattern.as_str(), "/about");
        assert_eq!(route.aliases, ["/about-us"]);
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let registry: Vec<RegistryEntry> = vec![
            Err(MalformedEndpoint {
                entry: "endpoint[0]".into(),
                reason: "bad".into(),
            }),
            Ok(opted(endpoint("broken", &["/user/{id"]))),
            Ok(opted(endpoint("ok", &["/ok"]))),
        ];

        let catalog = build_catalog(&registry);
        assert_eq!(catalog.malformed.len(), 2);
        assert_eq!(catalog.malformed[1].entry, "broken");
        assert_eq!(catalog.routes.len(), 1);
        assert_eq!(catalog.routes[0].handler, "ok");
    }

    #[test]
    fn test_default_provider_name() {
        let registry: Vec<RegistryEntry> = vec![Ok(opted(endpoint("user", &["/user/{id}"])))];
        let catalog = build_catalog(&registry);
        let provider = catalog.routes[0].provider.as_ref().unwrap();
        assert_eq!(provider.component, DEFAULT_PROVIDER);
        assert!(provider.method.is_none());
    }
}
