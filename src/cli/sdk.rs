//! `hxdeps sdk`: the registry of Haxe installations.
//!
//! ```bash
//! hxdeps sdk add stable /opt/haxe-4.3.6
//! hxdeps sdk add nightly ~/haxe/nightly --neko ~/haxe/neko
//! hxdeps sdk default stable
//! hxdeps sdk list
//! hxdeps sdk detect --save
//! ```

use super::common::CommandContext;
use crate::config::SdkEntry;
use crate::toolchain::{DISCOVERED_SDK_NAME, HaxeSdk, discover_sdk_async, invalidate_discovery};
use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

/// Manage registered Haxe SDKs.
#[derive(Args, Debug)]
pub struct SdkCommand {
    #[command(subcommand)]
    command: Option<SdkSubcommands>,
}

#[derive(Subcommand, Debug)]
enum SdkSubcommands {
    /// List registered SDKs (the default)
    List,

    /// Register an SDK under a name
    Add {
        /// Name to register the SDK under
        name: String,
        /// Install root (the directory containing `haxe`)
        path: PathBuf,
        /// Neko install root, if not next to the SDK or on PATH
        #[arg(long)]
        neko: Option<PathBuf>,
        /// Register even if `haxe -version` fails
        #[arg(long)]
        force: bool,
    },

    /// Unregister an SDK
    Remove {
        /// Registered name
        name: String,
    },

    /// Make a registered SDK the default
    Default {
        /// Registered name
        name: String,
    },

    /// Look for an SDK through HAXEPATH and PATH
    Detect {
        /// Register the detected SDK and make it the default if none is set
        #[arg(long)]
        save: bool,
    },
}

impl SdkCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command.unwrap_or(SdkSubcommands::List) {
            SdkSubcommands::List => list(ctx).await,
            SdkSubcommands::Add {
                name,
                path,
                neko,
                force,
            } => add(ctx, name, path, neko, force).await,
            SdkSubcommands::Remove {
                name,
            } => remove(ctx, &name).await,
            SdkSubcommands::Default {
                name,
            } => set_default(ctx, &name).await,
            SdkSubcommands::Detect {
                save,
            } => detect(ctx, save).await,
        }
    }
}

async fn describe(sdk: &HaxeSdk) -> String {
    match sdk.probe_version().await {
        Some(version) => version.green().to_string(),
        None => "invalid".red().to_string(),
    }
}

async fn list(ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_global().await?;
    if config.sdks.is_empty() {
        println!("No SDKs registered.");
        println!("\n{}", "Tip:".yellow());
        println!("  Run 'hxdeps sdk detect --save' or 'hxdeps sdk add <name> <path>'");
        return Ok(());
    }

    for entry in &config.sdks {
        let marker = if config.default_sdk.as_deref() == Some(entry.name.as_str()) { "*" } else { " " };
        let sdk = entry.to_sdk();
        println!("{marker} {} {} ({})", entry.name.bold(), entry.path.display(), describe(&sdk).await);
    }
    Ok(())
}

async fn add(ctx: &CommandContext, name: String, path: PathBuf, neko: Option<PathBuf>, force: bool) -> Result<()> {
    let entry = SdkEntry {
        name,
        path,
        neko,
    };
    let sdk = entry.to_sdk();
    if !force {
        sdk.ensure_valid().await?;
    }

    let mut config = ctx.load_global().await?;
    let first = config.sdks.is_empty();
    let name = entry.name.clone();
    config.add_sdk_entry(entry);
    if first {
        config.set_default_sdk(&name)?;
    }
    ctx.save_global(&config).await?;

    println!("✅ Registered SDK '{}' ({})", name.green(), describe(&sdk).await);
    if first {
        println!("   Set as default");
    }
    Ok(())
}

async fn remove(ctx: &CommandContext, name: &str) -> Result<()> {
    let mut config = ctx.load_global().await?;
    if !config.remove_sdk(name) {
        bail!("SDK '{name}' is not registered");
    }
    ctx.save_global(&config).await?;
    println!("✅ Removed SDK '{}'", name.red());
    Ok(())
}

async fn set_default(ctx: &CommandContext, name: &str) -> Result<()> {
    let mut config = ctx.load_global().await?;
    config.set_default_sdk(name)?;
    ctx.save_global(&config).await?;
    println!("✅ Default SDK is now '{}'", name.green());
    Ok(())
}

async fn detect(ctx: &CommandContext, save: bool) -> Result<()> {
    // An explicit detect always searches again.
    invalidate_discovery();
    let Some(sdk) = discover_sdk_async().await else {
        bail!("No Haxe installation found through HAXEPATH or PATH");
    };
    println!("Found Haxe {} at {}", describe(&sdk).await, sdk.install_root().display());
    match sdk.neko_vm() {
        Some(neko) => println!("Neko at {}", neko.install_root().display()),
        None => println!("{}", "Neko not found; installing libraries will fail".yellow()),
    }

    if save {
        let mut config = ctx.load_global().await?;
        config.add_sdk(DISCOVERED_SDK_NAME, sdk.install_root());
        if config.default_sdk().is_none() {
            config.set_default_sdk(DISCOVERED_SDK_NAME)?;
        }
        ctx.save_global(&config).await?;
        println!("✅ Registered as '{DISCOVERED_SDK_NAME}'");
    }
    Ok(())
}
