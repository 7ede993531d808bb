//! Command-line interface for hxdeps.
//!
//! Every subcommand works on one project directory (`--project`, default the
//! current directory) and the global SDK registry (`--config`, default
//! `~/.hxdeps/config.toml`).
//!
//! # Commands
//!
//! - `resolve` - Print the build system, build file, source paths, and the
//!   full library set of the project
//! - `sources` - Print the project's source paths only
//! - `sdk` - Manage registered Haxe SDKs and the default one
//! - `config` - Show or change the project's build configuration
//! - `check` - Refresh the project if any of the given changed files matter
//!
//! # Examples
//!
//! ```bash
//! hxdeps sdk add stable /opt/haxe-4.3.6
//! hxdeps sdk default stable
//! hxdeps --project ~/games/platformer resolve --json
//! hxdeps config set build_system lime
//! hxdeps check project.xml src/Main.hx
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging
//! - `--quiet` - Errors only, no spinner
//! - `--no-progress` - No spinner
//! - `--config` - Path to the global configuration file
//! - `--project` - Project directory

mod check;
pub mod common;
mod config;
mod resolve;
mod sdk;
mod sources;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::CommandContext;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests can build one directly.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,

    /// Whether to hide the spinner.
    pub no_progress: bool,

    /// Global configuration file overriding the default location.
    pub config_path: Option<PathBuf>,

    /// Project directory; the current directory when `None`.
    pub project: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with defaults: no logging, spinner on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the verbosity flags. Calling this more
    /// than once is harmless.
    pub fn init_logging(&self) {
        let filter = match (std::env::var("RUST_LOG"), &self.log_level) {
            (Ok(_), _) => EnvFilter::from_default_env(),
            (Err(_), Some(level)) => EnvFilter::new(format!("hxdeps={level}")),
            (Err(_), None) => return,
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }

    /// Context handed to subcommands.
    pub fn context(&self) -> Result<CommandContext> {
        let project = match &self.project {
            Some(project) => std::path::absolute(project)?,
            None => std::env::current_dir()?,
        };
        Ok(CommandContext::new(project, self.config_path.clone(), self.no_progress))
    }
}

/// Haxe build-file inspection and haxelib dependency resolution.
#[derive(Parser)]
#[command(
    name = "hxdeps",
    about = "Inspect Haxe build files and resolve haxelib dependencies",
    version,
    long_about = "hxdeps reads hxml, Lime, and lix build files, finds the project's source paths, \
                  and resolves the transitive set of haxelib libraries, installing missing ones \
                  through the configured Haxe SDK."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file.
    ///
    /// Defaults to `HXDEPS_CONFIG_PATH`, then `~/.hxdeps/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory (defaults to the current directory).
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "HXDEPS_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the project's source paths and libraries.
    Resolve(resolve::ResolveCommand),

    /// Print the project's source paths.
    Sources(sources::SourcesCommand),

    /// Manage registered Haxe SDKs.
    Sdk(sdk::SdkCommand),

    /// Show or change the project's build configuration.
    Config(config::ConfigCommand),

    /// Refresh the project if any of the changed files affect its build.
    Check(check::CheckCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
            project: self.project.clone(),
        }
    }

    /// Run the parsed command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let ctx = config.context()?;

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&ctx).await,
            Commands::Sources(cmd) => cmd.execute(&ctx).await,
            Commands::Sdk(cmd) => cmd.execute(&ctx).await,
            Commands::Config(cmd) => cmd.execute(&ctx).await,
            Commands::Check(cmd) => cmd.execute(&ctx).await,
        }
    }
}
