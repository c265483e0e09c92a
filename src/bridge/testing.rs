//! Scripted engine for exercising the bridge without an interpreter.
//!
//! Each source line is a command:
//!
//! ```text
//! set <name> <text>       bind a global to bytes
//! table <name>            bind a global to a non-byte value
//! write <path> <text>     write a virtual file
//! print <text>            captured output
//! fail <Class> <message>  raise
//! spin                    loop until interrupted
//! return <text>           chunk return value
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

use super::engine::{Engine, EngineFactory, Slot};
use super::error::EngineFault;
use super::interrupt::Interrupt;

#[derive(Default)]
pub struct ScriptedFactory {
    created: AtomicUsize,
    fail: Option<String>,
    gate: Option<Receiver<()>>,
    ran: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFactory {
    pub fn failing(message: &str) -> Self {
        Self {
            fail: Some(message.into()),
            ..Self::default()
        }
    }

    /// Engine creation blocks until the returned sender fires (or is dropped).
    pub fn gated() -> (Self, Sender<()>) {
        let (tx, rx) = bounded(1);
        let factory = Self {
            gate: Some(rx),
            ..Self::default()
        };
        (factory, tx)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Sources run by any engine from this factory, in order.
    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().clone()
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Engine>, EngineFault> {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if let Some(message) = &self.fail {
            return Err(EngineFault::new("EngineError", message.clone()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine {
            ran: Arc::clone(&self.ran),
            ..ScriptedEngine::default()
        }))
    }
}

#[derive(Default)]
pub struct ScriptedEngine {
    bindings: HashMap<String, Slot>,
    files: BTreeMap<String, Vec<u8>>,
    output: Vec<String>,
    ran: Arc<Mutex<Vec<String>>>,
}

impl Engine for ScriptedEngine {
    fn create_dir(&mut self, _path: &str) -> Result<(), EngineFault> {
        Ok(())
    }

    fn write_asset(&mut self, path: &str, bytes: &[u8]) -> Result<(), EngineFault> {
        self.files.insert(path.into(), bytes.to_vec());
        Ok(())
    }

    fn read_asset(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }

    fn remove_asset(&mut self, path: &str) {
        self.files.remove(path);
    }

    fn install_package(&mut self, name: &str, source: &str) -> Result<(), EngineFault> {
        if source.contains("syntax error") {
            return Err(EngineFault::new("SyntaxError", format!("{name}:1: syntax error")));
        }
        Ok(())
    }

    fn run(&mut self, source: &str, interrupt: &Interrupt) -> Result<Slot, EngineFault> {
        self.ran.lock().push(source.to_string());
        let mut returned = Slot::Empty;
        for line in source.lines() {
            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            match command {
                "set" => {
                    let (name, text) = rest.split_once(' ').unwrap_or((rest, ""));
                    self.bindings.insert(name.into(), Slot::Bytes(text.as_bytes().to_vec()));
                }
                "table" => {
                    self.bindings.insert(rest.into(), Slot::Mismatch("table".into()));
                }
                "write" => {
                    let (path, text) = rest.split_once(' ').unwrap_or((rest, ""));
                    self.files.insert(path.into(), text.as_bytes().to_vec());
                }
                "print" => self.output.push(rest.into()),
                "fail" => {
                    let (class, message) = rest.split_once(' ').unwrap_or((rest, ""));
                    return Err(EngineFault::from_text(class, message));
                }
                "spin" => loop {
                    if let Some(reason) = interrupt.reason() {
                        return Err(EngineFault::new("RuntimeError", reason.message()));
                    }
                    std::thread::sleep(std::time::Duration::from_millis(1));
                },
                "return" => returned = Slot::Bytes(rest.as_bytes().to_vec()),
                _ => {}
            }
        }
        Ok(returned)
    }

    fn binding(&self, name: &str) -> Result<Slot, EngineFault> {
        Ok(self.bindings.get(name).cloned().unwrap_or(Slot::Empty))
    }

    fn clear_binding(&mut self, name: &str) -> Result<(), EngineFault> {
        self.bindings.remove(name);
        Ok(())
    }

    fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}
