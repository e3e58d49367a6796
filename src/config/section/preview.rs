//! `[preview]` section configuration.
//!
//! ```toml
//! [preview]
//! interface = "127.0.0.1"   # 0.0.0.0 to serve on the LAN
//! port = 5277
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Static preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub interface: IpAddr,
    pub port: u16,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5277,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_preview_config() {
        let config = test_parse_config("[preview]\ninterface = \"0.0.0.0\"\nport = 9000");
        assert_eq!(config.preview.interface, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.preview.port, 9000);
    }

    #[test]
    fn test_preview_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.preview.port, 5277);
        assert!(config.preview.interface.is_loopback());
    }
}
