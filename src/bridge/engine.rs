//! Embedded runtime boundary.
//!
//! The bridge treats the interpreter as a black box behind [`Engine`].
//! Engines are created on (and never leave) the runtime thread, so they
//! need not be `Send`; only the [`EngineFactory`] crosses threads.

use super::error::EngineFault;
use super::interrupt::Interrupt;

/// Chunk name user source is loaded under. Diagnostics refer to it as
/// `playground:<line>:`.
pub const SOURCE_NAME: &str = "playground";

/// Content of an output channel after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Bytes(Vec<u8>),
    /// Holds a value of the named type that is not a byte string
    Mismatch(String),
}

pub trait Engine {
    /// Create a directory in the sandbox's virtual storage (no-op if present).
    fn create_dir(&mut self, path: &str) -> Result<(), EngineFault>;

    /// Stage a binary asset into virtual storage.
    fn write_asset(&mut self, path: &str, bytes: &[u8]) -> Result<(), EngineFault>;

    fn read_asset(&self, path: &str) -> Option<Vec<u8>>;

    fn remove_asset(&mut self, path: &str);

    /// Make `name` loadable from user code.
    fn install_package(&mut self, name: &str, source: &str) -> Result<(), EngineFault>;

    /// Run source to completion, returning the chunk's return value.
    fn run(&mut self, source: &str, interrupt: &Interrupt) -> Result<Slot, EngineFault>;

    /// Read a global binding.
    fn binding(&self, name: &str) -> Result<Slot, EngineFault>;

    fn clear_binding(&mut self, name: &str) -> Result<(), EngineFault>;

    /// Take text printed by scripts since the last call.
    fn drain_output(&mut self) -> Vec<String>;
}

/// Creates fresh engines on the runtime thread.
pub trait EngineFactory: Send + Sync + 'static {
    fn create(&self) -> Result<Box<dyn Engine>, EngineFault>;
}
