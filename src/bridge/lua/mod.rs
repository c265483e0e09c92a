//! Lua 5.4 engine (vendored through `mlua`).
//!
//! The sandbox loads only the table, string, math, utf8 and package
//! libraries. File-based module search is disabled; packages are reachable
//! only through `package.preload`. Scripts see a `vfs` table over the
//! in-memory [`Vfs`] and a `print` that is captured into the log.
//!
//! `coroutine` stays out: mlua hooks a single Lua thread, so a coroutine
//! would run outside the interrupt hook.

mod vfs;

pub use vfs::{Vfs, VfsError};

use std::cell::RefCell;
use std::rc::Rc;

use mlua::{Function, HookTriggers, Lua, LuaOptions, MultiValue, StdLib, Table, Value, VmState};

use super::engine::{Engine, EngineFactory, SOURCE_NAME, Slot};
use super::error::EngineFault;
use super::interrupt::Interrupt;

/// Instructions between two interrupt polls.
pub const HOOK_INTERVAL: u32 = 1000;

/// Captured `print` output kept per run.
pub const MAX_OUTPUT_LINES: usize = 5000;

/// Captured `print` output kept per run, in bytes.
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Globals removed after the standard libraries are loaded.
const REMOVED_GLOBALS: &[&str] = &["dofile", "loadfile"];

/// Builds a fresh [`LuaEngine`] per request of the bridge.
#[derive(Debug, Clone, Default)]
pub struct LuaFactory {
    /// Interpreter memory cap in bytes
    pub memory_limit: Option<usize>,
}

impl LuaFactory {
    pub fn new(memory_limit: Option<usize>) -> Self {
        Self { memory_limit }
    }
}

impl EngineFactory for LuaFactory {
    fn create(&self) -> Result<Box<dyn Engine>, EngineFault> {
        Ok(Box::new(LuaEngine::new(self.memory_limit)?))
    }
}

pub struct LuaEngine {
    lua: Lua,
    vfs: Rc<RefCell<Vfs>>,
    output: Rc<RefCell<Output>>,
}

/// Bounded `print` capture. Lines past the caps are counted, not stored.
#[derive(Debug, Default)]
struct Output {
    lines: Vec<String>,
    bytes: usize,
    dropped: usize,
}

impl Output {
    fn push(&mut self, line: String) {
        if self.lines.len() >= MAX_OUTPUT_LINES || self.bytes + line.len() > MAX_OUTPUT_BYTES {
            self.dropped += 1;
            return;
        }
        self.bytes += line.len();
        self.lines.push(line);
    }

    fn drain(&mut self) -> Vec<String> {
        let mut output = std::mem::take(self);
        if output.dropped > 0 {
            output
                .lines
                .push(format!("... {} more lines dropped", output.dropped));
        }
        output.lines
    }
}

impl LuaEngine {
    pub fn new(memory_limit: Option<usize>) -> Result<Self, EngineFault> {
        let libs = StdLib::TABLE
            | StdLib::STRING
            | StdLib::MATH
            | StdLib::UTF8
            | StdLib::PACKAGE;
        let lua = Lua::new_with(libs, LuaOptions::default()).map_err(engine_error)?;

        let engine = Self {
            lua,
            vfs: Rc::new(RefCell::new(Vfs::new())),
            output: Rc::new(RefCell::new(Output::default())),
        };
        engine.lock_down().map_err(engine_error)?;
        engine.install_print().map_err(engine_error)?;
        engine.install_vfs().map_err(engine_error)?;

        if let Some(limit) = memory_limit {
            engine.lua.set_memory_limit(limit).map_err(engine_error)?;
        }
        Ok(engine)
    }

    fn lock_down(&self) -> mlua::Result<()> {
        let globals = self.lua.globals();
        for name in REMOVED_GLOBALS {
            globals.set(*name, Value::Nil)?;
        }
        let package: Table = globals.get("package")?;
        package.set("path", "")?;
        package.set("cpath", "")?;
        package.set("loadlib", Value::Nil)?;
        Ok(())
    }

    fn install_print(&self) -> mlua::Result<()> {
        let globals = self.lua.globals();
        let tostring: Function = globals.get("tostring")?;
        let output = Rc::clone(&self.output);
        let print = self.lua.create_function(move |_, args: MultiValue| {
            let mut parts = Vec::with_capacity(args.len());
            for value in args {
                let part = match value {
                    Value::String(s) => s.to_string_lossy(),
                    other => tostring.call::<String>(other)?,
                };
                parts.push(part);
            }
            output.borrow_mut().push(parts.join("\t"));
            Ok(())
        })?;
        globals.set("print", print)
    }

    fn install_vfs(&self) -> mlua::Result<()> {
        let lua = &self.lua;
        let table = lua.create_table()?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "read",
            lua.create_function(move |lua, path: String| {
                let vfs = vfs.borrow();
                let bytes = vfs.read(&path).map_err(mlua::Error::external)?;
                lua.create_string(bytes)
            })?,
        )?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "write",
            lua.create_function(move |_, (path, data): (String, mlua::String)| {
                vfs.borrow_mut()
                    .write(&path, data.as_bytes().to_vec())
                    .map_err(mlua::Error::external)
            })?,
        )?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "exists",
            lua.create_function(move |_, path: String| Ok(vfs.borrow().exists(&path)))?,
        )?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "mkdir",
            lua.create_function(move |_, path: String| {
                vfs.borrow_mut().mkdir(&path).map_err(mlua::Error::external)
            })?,
        )?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "remove",
            lua.create_function(move |_, path: String| {
                vfs.borrow_mut().remove(&path).map_err(mlua::Error::external)
            })?,
        )?;

        let vfs = Rc::clone(&self.vfs);
        table.set(
            "list",
            lua.create_function(move |lua, path: String| {
                let names = vfs.borrow().list(&path).map_err(mlua::Error::external)?;
                lua.create_sequence_from(names)
            })?,
        )?;

        lua.globals().set("vfs", table)
    }
}

impl Engine for LuaEngine {
    fn create_dir(&mut self, path: &str) -> Result<(), EngineFault> {
        self.vfs.borrow_mut().mkdir(path).map_err(vfs_error)
    }

    fn write_asset(&mut self, path: &str, bytes: &[u8]) -> Result<(), EngineFault> {
        self.vfs
            .borrow_mut()
            .write(path, bytes.to_vec())
            .map_err(vfs_error)
    }

    fn read_asset(&self, path: &str) -> Option<Vec<u8>> {
        self.vfs.borrow().read(path).ok().map(<[u8]>::to_vec)
    }

    fn remove_asset(&mut self, path: &str) {
        let _ = self.vfs.borrow_mut().remove(path);
    }

    fn install_package(&mut self, name: &str, source: &str) -> Result<(), EngineFault> {
        let loader = self
            .lua
            .load(source)
            .set_name(format!("={name}"))
            .into_function()
            .map_err(|e| fault(&e))?;
        let package: Table = self.lua.globals().get("package").map_err(|e| fault(&e))?;
        let preload: Table = package.get("preload").map_err(|e| fault(&e))?;
        preload.set(name, loader).map_err(|e| fault(&e))
    }

    fn run(&mut self, source: &str, interrupt: &Interrupt) -> Result<Slot, EngineFault> {
        let hook_interrupt = interrupt.clone();
        self.lua.set_hook(
            HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
            move |lua, _| match hook_interrupt.reason() {
                Some(reason) => {
                    // Once interrupted, fail on every instruction so `pcall`
                    // cannot swallow the error and keep the script alive.
                    lua.set_hook(HookTriggers::new().every_nth_instruction(1), move |_, _| {
                        Err(mlua::Error::runtime(reason.message()))
                    });
                    Err(mlua::Error::runtime(reason.message()))
                }
                None => Ok(VmState::Continue),
            },
        );

        let result = self
            .lua
            .load(source)
            .set_name(format!("={SOURCE_NAME}"))
            .call::<Value>(());
        self.lua.remove_hook();

        let value = result.map_err(|e| fault(&e))?;
        if let Some(reason) = interrupt.reason() {
            return Err(EngineFault::new("RuntimeError", reason.message()));
        }
        Ok(slot(&value))
    }

    fn binding(&self, name: &str) -> Result<Slot, EngineFault> {
        let value: Value = self.lua.globals().get(name).map_err(|e| fault(&e))?;
        Ok(slot(&value))
    }

    fn clear_binding(&mut self, name: &str) -> Result<(), EngineFault> {
        self.lua
            .globals()
            .set(name, Value::Nil)
            .map_err(|e| fault(&e))
    }

    fn drain_output(&mut self) -> Vec<String> {
        self.output.borrow_mut().drain()
    }
}

fn slot(value: &Value) -> Slot {
    match value {
        Value::Nil => Slot::Empty,
        Value::String(s) => Slot::Bytes(s.as_bytes().to_vec()),
        other => Slot::Mismatch(other.type_name().to_string()),
    }
}

/// Map an interpreter error onto the engine's error classes.
fn fault(err: &mlua::Error) -> EngineFault {
    match err {
        mlua::Error::SyntaxError { message, .. } => EngineFault::from_text("SyntaxError", message),
        mlua::Error::RuntimeError(message) => EngineFault::from_text("RuntimeError", message),
        mlua::Error::MemoryError(message) => EngineFault::from_text("MemoryError", message),
        mlua::Error::CallbackError { traceback, cause } => {
            let inner = fault(cause);
            if inner.trace.is_some() || traceback.is_empty() {
                inner
            } else {
                inner.with_trace(traceback.clone())
            }
        }
        mlua::Error::WithContext { cause, .. } => fault(cause),
        other => EngineFault::from_text("RuntimeError", &other.to_string()),
    }
}

fn engine_error(err: mlua::Error) -> EngineFault {
    EngineFault::new("EngineError", err.to_string())
}

fn vfs_error(err: VfsError) -> EngineFault {
    EngineFault::new("VfsError", err.to_string())
}
