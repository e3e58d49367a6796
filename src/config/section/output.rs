//! `[output]` section configuration.
//!
//! ```toml
//! [output]
//! dir = "dist"             # Distribution root (relative to project root)
//! html_extension = true    # /a/b -> a/b.html (false: a/b)
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::is_within;

const DIR: FieldPath = FieldPath::new("output.dir");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Distribution root. Cleared on every `generate`.
    pub dir: PathBuf,

    /// Append `.html` to snapshot file names.
    pub html_extension: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "dist".into(),
            html_extension: true,
        }
    }
}

impl OutputConfig {
    /// The root is wiped before each run, so it must sit strictly below the
    /// project root. Both paths are normalized.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if is_within(root, &self.dir) {
            diag.error_with_hint(
                DIR,
                format!(
                    "`{}` contains the project root and would be cleared",
                    self.dir.display()
                ),
                "point `output.dir` at a dedicated directory such as `dist`",
            );
        }
    }
}
