//! Materializer: concrete URIs onto a deterministic file layout.
//!
//! | concrete uri | `html_extension = true` | `html_extension = false` |
//! |--------------|-------------------------|--------------------------|
//! | `/`          | `{root}/index.html`     | `{root}/index`           |
//! | `/a/b`       | `{root}/a/b.html`       | `{root}/a/b`             |
//! | `/docs/`     | `{root}/docs/index.html`| `{root}/docs/index`      |
//!
//! The whole plan is resolved and checked for conflicts before anything on
//! disk is touched. Phases then run strictly in order: clear, copy, write.

mod conflict;
mod write;

use std::path::PathBuf;

use crate::core::WriteError;
use crate::debug;
use crate::route::ConcreteUri;

pub use conflict::{ConflictKind, TargetConflict, detect_conflicts, print_conflicts};
pub use write::{clear_root, copy_assets, write_target};

/// Resolved filesystem path and the bytes to write there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A concrete URI paired with the file it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub uri: ConcreteUri,
    /// Relative to the distribution root.
    pub relative: PathBuf,
}

/// Output plan for one run.
#[derive(Debug, Default)]
pub struct Plan {
    /// One entry per distinct URI, in expansion order.
    pub files: Vec<PlannedFile>,
    /// URIs that cannot be mapped to a file inside the root.
    pub rejected: Vec<(ConcreteUri, WriteError)>,
    pub conflicts: Vec<TargetConflict>,
}

impl Plan {
    /// Map every URI and check the result for conflicts.
    ///
    /// A URI string produced twice (by two routes, or twice by one provider)
    /// is written once; the first occurrence wins.
    pub fn build(uris: Vec<ConcreteUri>, html_extension: bool) -> Self {
        let mut plan = Self::default();
        let mut seen = rustc_hash::FxHashSet::default();

        for uri in uris {
            if !seen.insert(uri.path.clone()) {
                debug!("plan"; "{} listed more than once", uri.path);
                continue;
            }
            match relative_target(&uri.path, html_extension) {
                Ok(relative) => plan.files.push(PlannedFile { uri, relative }),
                Err(err) => plan.rejected.push((uri, err)),
            }
        }

        plan.conflicts = detect_conflicts(&plan.files);
        plan
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// File path for `uri`, relative to the distribution root.
pub fn relative_target(uri: &str, html_extension: bool) -> Result<PathBuf, WriteError> {
    let unsafe_path = || WriteError::UnsafePath(uri.to_string());

    let body = uri.strip_prefix('/').ok_or_else(unsafe_path)?;
    if body.contains('\0') {
        return Err(unsafe_path());
    }

    let mut segments: Vec<&str> = body.split('/').collect();
    // `/` and `/docs/` name a directory; its page is the index file
    if segments.last().is_some_and(|last| last.is_empty()) {
        segments.pop();
        segments.push("index");
    }

    let mut path = PathBuf::new();
    for segment in &segments {
        if segment.is_empty() || *segment == "." || *segment == ".." {
            return Err(unsafe_path());
        }
        path.push(segment);
    }

    if html_extension {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".html");
        path.set_file_name(name);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(uri: &str, html: bool) -> String {
        relative_target(uri, html)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/")
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(rel("/", true), "index.html");
        assert_eq!(rel("/", false), "index");
    }

    #[test]
    fn test_nested_uri() {
        assert_eq!(rel("/a/b", true), "a/b.html");
        assert_eq!(rel("/a/b", false), "a/b");
        assert_eq!(rel("/user/1", true), "user/1.html");
    }

    #[test]
    fn test_trailing_slash_maps_to_index() {
        assert_eq!(rel("/docs/", true), "docs/index.html");
        assert_eq!(rel("/docs/", false), "docs/index");
    }

    #[test]
    fn test_dotted_name_keeps_extension_policy() {
        assert_eq!(rel("/feed.xml", true), "feed.xml.html");
        assert_eq!(rel("/feed.xml", false), "feed.xml");
    }

    #[test]
    fn test_unsafe_uris_rejected() {
        for uri in ["", "about", "/../etc", "/a/./b", "/a//b", "//", "/a\0b"] {
            assert!(
                matches!(relative_target(uri, true), Err(WriteError::UnsafePath(_))),
                "{uri:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_plan_dedupes_identical_uris() {
        let uris = vec![
            ConcreteUri::new("/about", "about"),
            ConcreteUri::new("/about", "aboutAlias"),
            ConcreteUri::new("/user/1", "user"),
        ];
        let plan = Plan::build(uris, true);
        assert_eq!(plan.files.len(), 2);
        assert_eq!(plan.files[0].uri.route, "about");
        assert!(!plan.has_conflicts());
    }

    #[test]
    fn test_plan_collects_rejected_and_conflicts() {
        let uris = vec![
            ConcreteUri::new("/a/../b", "bad"),
            ConcreteUri::new("/docs", "docs"),
            ConcreteUri::new("/docs/intro", "intro"),
        ];
        let plan = Plan::build(uris, false);
        assert_eq!(plan.rejected.len(), 1);
        assert_eq!(plan.files.len(), 2);
        assert!(plan.has_conflicts());
    }
}
