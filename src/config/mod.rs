//! Project configuration management for `vellum.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── source     # [source]
//! │   ├── runtime    # [runtime]
//! │   ├── output     # [output]
//! │   ├── trigger    # [trigger]
//! │   └── serve      # [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # PlaygroundConfig (this file)
//! ```
//!
//! Paths in the file are relative to the project root (the directory
//! holding `vellum.toml`); paths given on the command line are relative to
//! the working directory. Without a config file, defaults apply and the
//! working directory is the root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    ContractKind, OutputConfig, RuntimeConfig, ServeConfig, SourceConfig, TriggerConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::bridge::RuntimeOptions;
use crate::cli::{Cli, Commands, RunArgs};
use crate::utils::path::{normalize_path, resolve_from};
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing vellum.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl PlaygroundConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; `init` targets the
    /// directory being created instead.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let (config_path, exists) = Self::resolve_config_path(cli, &cwd);

        let mut diag = ConfigDiagnostics::new();
        let mut config = if exists && !cli.is_init() {
            Self::from_path(&config_path, &mut diag)?
        } else {
            if !cli.is_init() {
                debug!("config"; "{} not found, using defaults", cli.config.display());
            }
            Self::default()
        };

        let root = match &cli.command {
            Commands::Init { name: Some(name) } => cwd.join(name),
            Commands::Init { name: None } => cwd.clone(),
            _ if exists => config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone()),
            _ => cwd.clone(),
        };

        config.config_path = config_path;
        config.finalize(&root, &cwd, cli);

        if !cli.is_init() {
            config.validate(&mut diag);
            diag.print_warnings();
            diag.into_result().map_err(ConfigError::Diagnostics)?;
        }
        Ok(config)
    }

    /// Resolve config file path based on command.
    fn resolve_config_path(cli: &Cli, cwd: &Path) -> (PathBuf, bool) {
        match &cli.command {
            Commands::Init { name } => {
                let dir = name.as_ref().map_or_else(|| cwd.to_path_buf(), |n| cwd.join(n));
                let path = dir.join(&cli.config);
                let exists = path.exists();
                (path, exists)
            }
            _ => match find_config_file(&cli.config) {
                Some(path) => (path, true),
                None => (cwd.join(&cli.config), false),
            },
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path, diag: &mut ConfigDiagnostics) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        for field in ignored {
            diag.warn(field, "unknown field");
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Resolve paths and apply command-line overrides.
    fn finalize(&mut self, root: &Path, cwd: &Path, cli: &Cli) {
        self.root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);

        if !self.source.entry.as_os_str().is_empty() {
            self.source.entry = resolve_from(&self.root, &self.source.entry);
        }
        self.runtime.assets = resolve_from(&self.root, &self.runtime.assets);
        self.output.path = resolve_from(&self.root, &self.output.path);

        self.apply_command_options(cli, cwd);
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli, cwd: &Path) {
        crate::logger::set_verbose(cli.is_verbose());

        match &cli.command {
            Commands::Run { args } | Commands::Watch { args } => self.apply_run_args(args, cwd),
            Commands::Serve {
                entry,
                interface,
                port,
                ..
            } => {
                if let Some(entry) = entry {
                    self.source.entry = resolve_from(cwd, entry);
                }
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Init { .. } => {}
        }
    }

    fn apply_run_args(&mut self, args: &RunArgs, cwd: &Path) {
        if let Some(entry) = &args.entry {
            self.source.entry = resolve_from(cwd, entry);
        }
        if let Some(output) = &args.output {
            self.output.path = resolve_from(cwd, output);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Collect all validation errors.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.source.validate(diag);
        self.output.validate(diag);
        self.trigger.validate(diag);
        self.serve.validate(diag);
    }

    /// Settings for the runtime bridge.
    pub fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            assets: self.runtime.assets.clone(),
            timeout: self.runtime.timeout(),
            memory_limit: self.runtime.memory_limit(),
            isolate: self.runtime.isolate,
            contract: self.output.contract(),
        }
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Log where the entry and the document live.
    pub fn log_summary(&self) {
        log!(
            "vellum";
            "{} -> {}",
            self.root_relative(&self.source.entry).display(),
            self.root_relative(&self.output.path).display()
        );
    }
}

// ============================================================================
// tests
// ============================================================================
