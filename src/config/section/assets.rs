//! `[[assets]]` entries: static resource trees copied verbatim.
//!
//! ```toml
//! [[assets]]
//! prefix = "/static/**"   # URL prefix served by the host
//! dir = "public/static"   # Resource root (relative to project root)
//! ```
//!
//! `/static/**` copies `dir` to `{dist}/static/`; `/**` copies it to the
//! distribution root itself. Other prefixes cannot be mapped onto a directory
//! and are skipped with a warning.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::is_within;

const ASSETS: FieldPath = FieldPath::new("assets");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetMount {
    pub prefix: String,
    pub dir: PathBuf,
}

impl AssetMount {
    /// Subpath under the distribution root, or `None` if the prefix is not
    /// a `/**` tree prefix.
    ///
    /// `"/static/**"` → `Some("static")`, `"/**"` → `Some("")`.
    pub fn mount_path(&self) -> Option<&str> {
        self.prefix
            .strip_suffix("/**")
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.split('/').any(|seg| seg == "." || seg == ".."))
    }

    pub fn validate(&self, idx: usize, output_dir: &Path, diag: &mut ConfigDiagnostics) {
        if self.mount_path().is_none() {
            diag.warn(
                ASSETS,
                format!("[{idx}] prefix `{}` does not end with `/**`, skipped", self.prefix),
            );
        }
        if is_within(&self.dir, output_dir) {
            diag.error(
                ASSETS,
                format!(
                    "[{idx}] `{}` lies inside the distribution root and would be cleared",
                    self.dir.display()
                ),
            );
        }
        if !self.dir.exists() {
            diag.warn(ASSETS, format!("[{idx}] `{}` not found", self.dir.display()));
        }
    }
}
