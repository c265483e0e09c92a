//! Output contract: where a script hands over its artifact.

use std::fmt;

use super::engine::{Engine, Slot};
use super::error::EngineFault;

/// Declared output channel of user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputContract {
    /// A global variable holding the document bytes
    Binding(String),
    /// A file in the sandbox's virtual storage
    File(String),
    /// The chunk's return value
    Return,
}

impl Default for OutputContract {
    fn default() -> Self {
        Self::Binding("result".into())
    }
}

impl OutputContract {
    /// Empty the channel so a previous run's artifact cannot leak into this one.
    pub fn reset(&self, engine: &mut dyn Engine) -> Result<(), EngineFault> {
        match self {
            Self::Binding(name) => engine.clear_binding(name),
            Self::File(path) => {
                engine.remove_asset(path);
                Ok(())
            }
            Self::Return => Ok(()),
        }
    }

    /// Read the channel after a run. `returned` is the chunk's return value.
    pub fn extract(&self, engine: &dyn Engine, returned: Slot) -> Result<Slot, EngineFault> {
        match self {
            Self::Binding(name) => engine.binding(name),
            Self::File(path) => Ok(engine.read_asset(path).map_or(Slot::Empty, Slot::Bytes)),
            Self::Return => Ok(returned),
        }
    }

    /// Hint shown when the channel is empty after a run.
    pub fn missing_message(&self) -> String {
        match self {
            Self::Binding(name) => format!(
                "no document found: set the `{name}` variable to the document bytes"
            ),
            Self::File(path) => {
                format!("no document found: write the document bytes to `{path}`")
            }
            Self::Return => "no document found: return the document bytes from the script".into(),
        }
    }

    /// Message for a channel holding something other than bytes.
    pub fn mismatch_message(&self, type_name: &str) -> String {
        format!("{self} holds a {type_name}, expected a byte string")
    }
}

impl fmt::Display for OutputContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding(name) => write!(f, "variable `{name}`"),
            Self::File(path) => write!(f, "file `{path}`"),
            Self::Return => f.write_str("return value"),
        }
    }
}
