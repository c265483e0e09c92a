//! `[trigger]` section configuration.
//!
//! ```toml
//! [trigger]
//! quiet = 1000                # ms without edits before the script runs
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Quiet interval in milliseconds.
    pub quiet: u64,
}

impl TriggerConfig {
    pub const QUIET: FieldPath = FieldPath::new("trigger.quiet");

    pub fn quiet(&self) -> Duration {
        Duration::from_millis(self.quiet)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.quiet == 0 {
            diag.error_with_hint(
                Self::QUIET,
                "quiet interval must be greater than 0",
                "1000 ms waits for a one-second pause in typing",
            );
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self { quiet: 1000 }
    }
}
