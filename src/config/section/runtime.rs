//! `[runtime]` section configuration.
//!
//! ```toml
//! [runtime]
//! assets = "assets"           # Resource index: fonts/ and packages/
//! timeout = 10000             # ms per execution, 0 = no limit
//! memory_limit = 256          # MiB, 0 = no limit
//! isolate = false             # Fresh sandbox for every execution
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Resource index directory, relative to the project root.
    pub assets: PathBuf,

    /// Wall-clock limit per execution in milliseconds.
    pub timeout: u64,

    /// Interpreter memory limit in MiB.
    pub memory_limit: u64,

    /// Recreate the sandbox before every execution.
    /// - `false` (default): globals persist between runs
    /// - `true`: every run starts from freshly staged resources
    pub isolate: bool,
}

impl RuntimeConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_millis(self.timeout))
    }

    /// Memory limit in bytes.
    pub fn memory_limit(&self) -> Option<usize> {
        (self.memory_limit > 0).then(|| (self.memory_limit as usize).saturating_mul(1024 * 1024))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            timeout: 10_000,
            memory_limit: 256,
            isolate: false,
        }
    }
}
