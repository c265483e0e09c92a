//! One-shot execution: run the entry script once and write its document.

use std::sync::Arc;

use anyhow::{Result, bail};

use super::common::{describe, display_name, read_entry, write_artifact};
use crate::bridge::lua::LuaFactory;
use crate::bridge::{Bridge, CancelToken, EngineFactory, RuntimeOptions};
use crate::config::PlaygroundConfig;
use crate::core::{ExecutionRequest, ExecutionResult, FailureKind};
use crate::display::format_failure;
use crate::{debug, log};

/// Execute the configured entry once.
///
/// Errors (including script failures) end the process with a non-zero
/// exit code through `main`.
pub fn run_once(config: &PlaygroundConfig) -> Result<()> {
    let options = config.runtime_options();
    let factory = Arc::new(LuaFactory::new(options.memory_limit));
    let source = read_entry(&config.source.entry)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(execute(options, factory, source));

    let entry = display_name(&config.source.entry);
    match result {
        ExecutionResult::Success { artifact } => {
            write_artifact(&config.output.path, &artifact)?;
            log!(
                "run";
                "{} -> {} ({})",
                entry,
                config.root_relative(&config.output.path).display(),
                describe(&artifact)
            );
            Ok(())
        }
        ExecutionResult::Failure(failure) => {
            if let Some(trace) = &failure.trace {
                debug!("run"; "{}", trace);
            }
            bail!("{} failed: {}", entry, format_failure(&failure))
        }
    }
}

/// Start a bridge, run one request, stop the bridge.
async fn execute(
    options: RuntimeOptions,
    factory: Arc<dyn EngineFactory>,
    source: String,
) -> ExecutionResult {
    let bridge = match Bridge::initialize(options, factory).await {
        Ok(bridge) => bridge,
        Err(e) => {
            return crate::core::Failure::new(FailureKind::InitError, e.to_string()).into();
        }
    };
    let result = bridge
        .execute(ExecutionRequest::new(1, source), CancelToken::new())
        .await;
    bridge.shutdown();
    result
}
