//! `[source]` section configuration.
//!
//! ```toml
//! [source]
//! entry = "main.lua"          # Script executed on every settled edit
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Entry script, relative to the project root.
    pub entry: PathBuf,
}

impl SourceConfig {
    pub const ENTRY: FieldPath = FieldPath::new("source.entry");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entry.as_os_str().is_empty() {
            diag.error(Self::ENTRY, "entry script must not be empty");
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("main.lua"),
        }
    }
}
