//! Runtime-thread side of the bridge: owns the engine and runs requests.

use std::sync::Arc;
use std::time::Instant;

use super::RuntimeOptions;
use super::diagnostic::extract_line;
use super::engine::{Engine, EngineFactory, Slot};
use super::error::{EngineFault, InitError};
use super::interrupt::Interrupt;
use super::resources::Resources;
use crate::core::{ExecutionRequest, ExecutionResult, Failure, FailureKind};
use crate::{debug, log};

pub struct RuntimeHost {
    factory: Arc<dyn EngineFactory>,
    resources: Resources,
    options: RuntimeOptions,
    engine: Box<dyn Engine>,
    /// Engine has run user code since it was prepared
    dirty: bool,
}

impl RuntimeHost {
    /// Load resources and prepare the first engine.
    pub fn start(options: RuntimeOptions, factory: Arc<dyn EngineFactory>) -> Result<Self, InitError> {
        let resources = Resources::load(&options.assets)?;
        debug!(
            "runtime";
            "loaded {} fonts, {} packages from {}",
            resources.fonts.len(),
            resources.packages.len(),
            options.assets.display()
        );
        let engine = prepare(factory.as_ref(), &resources)?;
        Ok(Self {
            factory,
            resources,
            options,
            engine,
            dirty: false,
        })
    }

    /// Run one request to completion. Never panics on script failure.
    pub fn execute(&mut self, request: &ExecutionRequest, interrupt: &Interrupt) -> ExecutionResult {
        if self.options.isolate && self.dirty {
            match prepare(self.factory.as_ref(), &self.resources) {
                Ok(engine) => self.engine = engine,
                Err(e) => return Failure::new(FailureKind::InitError, e.to_string()).into(),
            }
        }
        self.dirty = true;

        let started = Instant::now();
        let result = self.run(request, interrupt);
        debug!(
            "runtime";
            "#{} finished in {:?} ({})",
            request.seq,
            started.elapsed(),
            if result.is_success() { "ok" } else { "failed" }
        );
        result
    }

    fn run(&mut self, request: &ExecutionRequest, interrupt: &Interrupt) -> ExecutionResult {
        let contract = &self.options.contract;
        if let Err(fault) = contract.reset(self.engine.as_mut()) {
            return fail(fault, interrupt).into();
        }

        let outcome = self.engine.run(&request.source, interrupt);
        for line in self.engine.drain_output() {
            log!("print"; "{}", line);
        }

        let returned = match outcome {
            Ok(returned) => returned,
            Err(fault) => return fail(fault, interrupt).into(),
        };

        match contract.extract(self.engine.as_ref(), returned) {
            Ok(Slot::Bytes(bytes)) => ExecutionResult::success(bytes),
            Ok(Slot::Empty) => Failure::new(FailureKind::OutputMissing, contract.missing_message()).into(),
            Ok(Slot::Mismatch(type_name)) => {
                Failure::new(FailureKind::OutputMissing, contract.mismatch_message(&type_name)).into()
            }
            Err(fault) => fail(fault, interrupt).into(),
        }
    }
}

fn prepare(factory: &dyn EngineFactory, resources: &Resources) -> Result<Box<dyn Engine>, InitError> {
    let mut engine = factory
        .create()
        .map_err(|e| InitError::Engine(e.to_string()))?;
    resources.stage(engine.as_mut())?;
    Ok(engine)
}

/// Turn an engine fault into a failure, preferring the interrupt's reason.
fn fail(fault: EngineFault, interrupt: &Interrupt) -> Failure {
    if let Some(reason) = interrupt.reason() {
        return interrupt.failure(reason);
    }
    let line = fault
        .line
        .or_else(|| extract_line(&fault.message))
        .or_else(|| fault.trace.as_deref().and_then(extract_line));
    Failure::new(FailureKind::Runtime(fault.class), fault.message)
        .with_line(line)
        .with_trace(fault.trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::OutputContract;
    use crate::bridge::interrupt::CancelToken;
    use crate::bridge::testing::ScriptedFactory;
    use std::fs;
    use tempfile::TempDir;

    fn options(dir: &TempDir, contract: OutputContract, isolate: bool) -> RuntimeOptions {
        RuntimeOptions {
            assets: dir.path().to_path_buf(),
            contract,
            isolate,
            ..RuntimeOptions::default()
        }
    }

    fn request(seq: u64, source: &str) -> ExecutionRequest {
        ExecutionRequest::new(seq, source)
    }

    #[test]
    fn test_success_returns_bytes() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory).unwrap();

        let result = host.execute(&request(1, "set result %PDF-1.7"), &Interrupt::never());
        assert_eq!(result, ExecutionResult::success(b"%PDF-1.7".to_vec()));
    }

    #[test]
    fn test_missing_binding_is_output_missing() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory).unwrap();

        let result = host.execute(&request(1, "set other x"), &Interrupt::never());
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::OutputMissing);
        assert!(failure.message.contains("`result`"));
    }

    #[test]
    fn test_stale_binding_cleared_between_runs() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory).unwrap();

        assert!(host.execute(&request(1, "set result doc"), &Interrupt::never()).is_success());
        let second = host.execute(&request(2, "set other x"), &Interrupt::never());
        assert_eq!(second.failure().unwrap().kind, FailureKind::OutputMissing);
    }

    #[test]
    fn test_runtime_error_line_from_text() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory).unwrap();

        let result = host.execute(
            &request(1, "fail SyntaxError playground:4: unexpected symbol"),
            &Interrupt::never(),
        );
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::runtime("SyntaxError"));
        assert_eq!(failure.line, Some(4));
    }

    #[test]
    fn test_cancelled_run_reports_cancelled() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let interrupt = Interrupt::start(token, CancelToken::new(), None);
        let result = host.execute(&request(1, "spin"), &interrupt);
        assert_eq!(result.failure().unwrap().kind, FailureKind::Cancelled);
    }

    #[test]
    fn test_isolate_recreates_engine() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host =
            RuntimeHost::start(options(&dir, OutputContract::default(), true), factory.clone()).unwrap();

        host.execute(&request(1, "set result a"), &Interrupt::never());
        host.execute(&request(2, "set result b"), &Interrupt::never());
        assert_eq!(factory.created(), 2);
    }

    #[test]
    fn test_reuse_keeps_engine() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let mut host =
            RuntimeHost::start(options(&dir, OutputContract::default(), false), factory.clone()).unwrap();

        host.execute(&request(1, "set result a"), &Interrupt::never());
        host.execute(&request(2, "set result b"), &Interrupt::never());
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_file_contract() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::write(dir.path().join("fonts/a.ttf"), b"font").unwrap();
        let factory = Arc::new(ScriptedFactory::default());
        let contract = OutputContract::File("/fonts/a.ttf".into());
        let mut host = RuntimeHost::start(options(&dir, contract, false), factory).unwrap();

        // reset removed the staged file before the run
        let result = host.execute(&request(1, "noop"), &Interrupt::never());
        assert_eq!(result.failure().unwrap().kind, FailureKind::OutputMissing);
    }

    #[test]
    fn test_engine_creation_failure() {
        let dir = TempDir::new().unwrap();
        let factory = Arc::new(ScriptedFactory::failing("no interpreter"));
        let err = RuntimeHost::start(options(&dir, OutputContract::default(), false), factory)
            .err()
            .unwrap();
        assert!(matches!(err, InitError::Engine(_)));
    }
}
