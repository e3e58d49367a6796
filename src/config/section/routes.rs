//! `[routes]` section configuration.
//!
//! ```toml
//! [routes]
//! manifest = "routes.toml"   # Route registry exported by the host
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub manifest: PathBuf,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            manifest: "routes.toml".into(),
        }
    }
}
