//! File target conflict detection.
//!
//! Two kinds of clash make a plan unwritable:
//!
//! ```text
//! duplicate        /docs/  → docs/index.html
//!                  /docs/index → docs/index.html
//!
//! file/directory   /a   → a          (html_extension = false)
//!                  /a/b → a/b        needs `a` to be a directory
//! ```

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::log;
use crate::utils::plural_s;

use super::PlannedFile;

/// Target path → URIs claiming it.
pub type TargetSourceMap<'a> = FxHashMap<&'a Path, Vec<&'a str>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Several URIs map to the same file.
    Duplicate,
    /// One URI's file is another URI's parent directory.
    FileDirectory,
}

/// A file target claimed in incompatible ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConflict {
    /// Relative to the distribution root.
    pub target: PathBuf,
    pub kind: ConflictKind,
    pub uris: Vec<String>,
}

/// Find every conflict in the plan. The result is sorted by target.
pub fn detect_conflicts(files: &[PlannedFile]) -> Vec<TargetConflict> {
    let mut sources = TargetSourceMap::default();
    for file in files {
        sources
            .entry(file.relative.as_path())
            .or_default()
            .push(file.uri.path.as_str());
    }

    let mut conflicts: Vec<TargetConflict> = sources
        .iter()
        .filter(|(_, uris)| uris.len() > 1)
        .map(|(target, uris)| TargetConflict {
            target: target.to_path_buf(),
            kind: ConflictKind::Duplicate,
            uris: uris.iter().map(|u| u.to_string()).collect(),
        })
        .collect();

    for file in files {
        for ancestor in file.relative.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if let Some(owners) = sources.get(ancestor) {
                let mut uris: Vec<String> = owners.iter().map(|u| u.to_string()).collect();
                uris.push(file.uri.path.clone());
                conflicts.push(TargetConflict {
                    target: ancestor.to_path_buf(),
                    kind: ConflictKind::FileDirectory,
                    uris,
                });
            }
        }
    }

    conflicts.sort_by(|a, b| a.target.cmp(&b.target).then_with(|| a.uris.cmp(&b.uris)));
    conflicts
}

/// Print conflicts using the standard log format.
///
/// ```text
/// [error] file target conflicts (1 target, 2 uris)
/// [target] docs/index.html (duplicate)
///   - /docs/
///   - /docs/index
/// ```
pub fn print_conflicts(conflicts: &[TargetConflict]) {
    if conflicts.is_empty() {
        return;
    }

    let total_uris: usize = conflicts.iter().map(|c| c.uris.len()).sum();
    log!("error"; "file target conflicts ({} target{}, {} uri{})",
        conflicts.len(), plural_s(conflicts.len()),
        total_uris, plural_s(total_uris));

    for conflict in conflicts {
        let kind = match conflict.kind {
            ConflictKind::Duplicate => "duplicate",
            ConflictKind::FileDirectory => "file is also a directory",
        };
        log!("target"; "{} ({})", conflict.target.display(), kind);
        for uri in &conflict.uris {
            eprintln!("  - {uri}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::ConcreteUri;

    fn planned(uri: &str, relative: &str) -> PlannedFile {
        PlannedFile {
            uri: ConcreteUri::new(uri, "h"),
            relative: PathBuf::from(relative),
        }
    }

    #[test]
    fn test_no_conflicts() {
        let files = vec![
            planned("/", "index.html"),
            planned("/a", "a.html"),
            planned("/a/b", "a/b.html"),
        ];
        assert!(detect_conflicts(&files).is_empty());
    }

    #[test]
    fn test_duplicate_target() {
        let files = vec![
            planned("/docs/", "docs/index.html"),
            planned("/docs/index", "docs/index.html"),
        ];
        let conflicts = detect_conflicts(&files);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Duplicate);
        assert_eq!(conflicts[0].uris, ["/docs/", "/docs/index"]);
    }

    #[test]
    fn test_file_directory_clash() {
        let files = vec![planned("/a", "a"), planned("/a/b/c", "a/b/c")];
        let conflicts = detect_conflicts(&files);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::FileDirectory);
        assert_eq!(conflicts[0].target, PathBuf::from("a"));
        assert_eq!(conflicts[0].uris, ["/a", "/a/b/c"]);
    }

    #[test]
    fn test_conflicts_sorted() {
        let files = vec![
            planned("/z", "z"),
            planned("/z/1", "z/1"),
            planned("/b", "b"),
            planned("/b/1", "b/1"),
        ];
        let targets: Vec<_> = detect_conflicts(&files)
            .into_iter()
            .map(|c| c.target)
            .collect();
        assert_eq!(targets, [PathBuf::from("b"), PathBuf::from("z")]);
    }
}
