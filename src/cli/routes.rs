//! `snapsite routes`: the generation plan without touching the live instance
//! or the distribution root.

use anyhow::Result;
use serde::Serialize;

use crate::config::SnapConfig;
use crate::log;
use crate::output::print_conflicts;

use super::generate::{PlannedRun, plan_run};

#[derive(Debug, Serialize)]
struct RouteRow<'a> {
    uri: &'a str,
    route: &'a str,
    target: String,
}

#[derive(Debug, Serialize)]
struct SkippedRow<'a> {
    route: &'a str,
    reason: &'a str,
}

#[derive(Debug, Serialize)]
struct RejectedRow<'a> {
    uri: &'a str,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ConflictRow<'a> {
    target: String,
    uris: &'a [String],
}

/// The `--json` document.
#[derive(Debug, Serialize)]
struct RoutesReport<'a> {
    files: Vec<RouteRow<'a>>,
    skipped: Vec<SkippedRow<'a>>,
    rejected: Vec<RejectedRow<'a>>,
    conflicts: Vec<ConflictRow<'a>>,
}

/// Print every concrete URI with the file it maps to.
///
/// Returns the process exit code: non-zero when a route could not be
/// expanded, a URI maps outside the root, or the plan has conflicts.
pub fn list_routes(config: &SnapConfig, json: bool) -> Result<i32> {
    let run = plan_run(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report(config, &run))?);
    } else {
        print_text(config, &run);
    }

    Ok(exit_code(&run))
}

fn exit_code(run: &PlannedRun) -> i32 {
    let failed = run.plan.has_conflicts()
        || !run.plan.rejected.is_empty()
        || !run.summary.skipped_routes.is_empty();
    i32::from(failed)
}

fn print_text(config: &SnapConfig, run: &PlannedRun) {
    let PlannedRun { plan, summary } = run;
    for file in &plan.files {
        log!("route"; "{} -> {}", file.uri.path, display_target(config, &file.relative));
    }
    for (uri, err) in &plan.rejected {
        log!("error"; "{}: {}", uri.path, err);
    }
    if plan.has_conflicts() {
        print_conflicts(&plan.conflicts);
    }
    summary.print_plan();
}

fn report<'a>(config: &SnapConfig, run: &'a PlannedRun) -> RoutesReport<'a> {
    let PlannedRun { plan, summary } = run;

    let files = plan
        .files
        .iter()
        .map(|file| RouteRow {
            uri: &file.uri.path,
            route: &file.uri.route,
            target: display_target(config, &file.relative),
        })
        .collect();
    let skipped = summary
        .skipped_routes
        .iter()
        .map(|s| SkippedRow {
            route: &s.route,
            reason: &s.reason,
        })
        .collect();
    let rejected = plan
        .rejected
        .iter()
        .map(|(uri, err)| RejectedRow {
            uri: &uri.path,
            reason: err.to_string(),
        })
        .collect();
    let conflicts = plan
        .conflicts
        .iter()
        .map(|c| ConflictRow {
            target: display_target(config, &c.target),
            uris: &c.uris,
        })
        .collect();

    RoutesReport {
        files,
        skipped,
        rejected,
        conflicts,
    }
}

/// Target path as shown to the user: relative to the project root, `/`-separated.
fn display_target(config: &SnapConfig, relative: &std::path::Path) -> String {
    config
        .root_relative(config.output.dir.join(relative))
        .to_string_lossy()
        .replace('\\', "/")
}
