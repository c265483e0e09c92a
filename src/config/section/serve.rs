//! `[serve]` section configuration.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5277                 # HTTP port number
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the preview accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,
}

impl ServeConfig {
    pub const PORT: FieldPath = FieldPath::new("serve.port");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must not be 0");
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5277,
        }
    }
}
