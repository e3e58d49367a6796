//! `snapsite generate`: catalog, expand, plan, then clear, copy and snapshot.
//!
//! ```text
//! manifest ─► catalog ─► expand ─► plan ─┬─ conflicts? abort, root untouched
//!                                        └─► clear ─► copy assets ─► fetch + write
//! ```

use anyhow::{Result, bail};

use crate::config::SnapConfig;
use crate::core::{Cancellation, FatalError, RunSummary, WriteError};
use crate::expand::{expand_routes, providers_from_config};
use crate::output::{FileTarget, Plan, clear_root, copy_assets, print_conflicts, write_target};
use crate::route::{ConcreteUri, ManifestRegistry, build_catalog};
use crate::snapshot::SnapshotFetcher;
use crate::utils::plural_count;
use crate::{debug, log};

/// Output plan plus the discovery half of the summary.
#[derive(Debug)]
pub struct PlannedRun {
    pub plan: Plan,
    pub summary: RunSummary,
}

/// Read the registry, expand every route and map the result onto files.
///
/// Touches neither the live instance nor the distribution root.
pub fn plan_run(config: &SnapConfig) -> Result<PlannedRun> {
    let registry = ManifestRegistry::load(&config.routes.manifest)?;
    let catalog = build_catalog(&registry);
    log!("catalog"; "{} ({} excluded, {} malformed)",
        plural_count(catalog.routes.len(), "route"), catalog.excluded, catalog.malformed.len());

    let providers = providers_from_config(config);
    debug!("expand"; "{} registered", plural_count(providers.len(), "provider"));
    let expansion = expand_routes(&catalog.routes, &providers);

    let plan = Plan::build(expansion.uris, config.output.html_extension);
    let summary = RunSummary {
        routes_discovered: catalog.routes.len(),
        malformed_endpoints: catalog.malformed.len(),
        skipped_routes: expansion.skipped,
        concrete_uris: plan.files.len() + plan.rejected.len(),
        ..Default::default()
    };

    Ok(PlannedRun { plan, summary })
}

/// Run a full generation and return its summary.
///
/// Conflicting targets abort before the root is cleared. A failure to clear
/// the root or copy assets aborts the run.
pub fn generate(config: &SnapConfig, cancel: &Cancellation) -> Result<RunSummary> {
    let PlannedRun { plan, mut summary } = plan_run(config)?;

    if plan.has_conflicts() {
        print_conflicts(&plan.conflicts);
        let uris = plan.conflicts.iter().map(|c| c.uris.len()).sum();
        bail!(WriteError::Conflicts(uris));
    }
    for (uri, err) in &plan.rejected {
        summary.fatal.push(FatalError::new(uri.path.clone(), err));
    }

    let fetcher = SnapshotFetcher::new(&config.live, cancel.clone())?;
    let root = &config.output.dir;

    clear_root(root)?;
    let copied = copy_assets(&config.assets, root)?;
    if copied > 0 {
        log!("assets"; "{} copied", plural_count(copied, "file"));
    }

    let uris: Vec<ConcreteUri> = plan.files.iter().map(|file| file.uri.clone()).collect();
    if !uris.is_empty() {
        log!("snapshot"; "{} from {}", plural_count(uris.len(), "uri"), fetcher.base());
    }

    let report = fetcher.run(&uris, |index, result| {
        let target = FileTarget {
            path: root.join(&plan.files[index].relative),
            bytes: result.body,
        };
        write_target(&target)
    });

    summary.successes = report.successes;
    summary.warnings = report.warnings;
    summary.fatal.extend(report.fatal);
    summary.not_started = report.not_started;

    summary.print();
    Ok(summary)
}
