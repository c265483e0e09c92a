//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Vellum live document playground CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: vellum.toml)
    #[arg(short = 'C', long, default_value = "vellum.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new playground project from template
    #[command(visible_alias = "i")]
    Init {
        /// Project directory name/path (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: Option<PathBuf>,
    },

    /// Execute the entry script once and write its document
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Re-run the entry script on every settled edit
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Live preview in the browser
    #[command(visible_alias = "s")]
    Serve {
        /// Entry script (overrides `source.entry`)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        entry: Option<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

/// Shared arguments for Run and Watch commands
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Entry script (overrides `source.entry`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub entry: Option<PathBuf>,

    /// Where to write the document (overrides `output.path`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }

    pub const fn is_verbose(&self) -> bool {
        match &self.command {
            Commands::Run { args } | Commands::Watch { args } => args.verbose,
            Commands::Serve { verbose, .. } => *verbose,
            Commands::Init { .. } => false,
        }
    }
}
