//! `hxdeps config`: the project's build configuration.
//!
//! Settings live in `<project>/.hxdeps/settings.toml`:
//!
//! | Key | Value |
//! |-----|-------|
//! | `build_system` | `hxml`, `lime`, or `lix`; detected from the layout when unset |
//! | `build_file` | build file to use instead of the default names |
//! | `alt_sdk` | registered SDK to use instead of the default |
//! | `auto_build` | `true` or `false` |
//!
//! Saving a change refreshes the project's dependencies.

use super::common::CommandContext;
use crate::project::{ProjectBuildConfig, SettingKey};
use crate::refresh::DependencyRefresher;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::sync::Arc;

/// Show or change the project's build configuration.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Show settings and what they resolve to (the default)
    Show,

    /// Change a setting
    Set {
        /// One of build_system, build_file, alt_sdk, auto_build
        key: SettingKey,
        /// New value
        value: String,
    },

    /// Remove a setting
    Unset {
        /// One of build_system, build_file, alt_sdk, auto_build
        key: SettingKey,
    },
}

impl ConfigCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command.unwrap_or(ConfigSubcommands::Show) {
            ConfigSubcommands::Show => show(ctx).await,
            ConfigSubcommands::Set {
                key,
                value,
            } => update(ctx, key, Some(value)).await,
            ConfigSubcommands::Unset {
                key,
            } => update(ctx, key, None).await,
        }
    }
}

async fn show(ctx: &CommandContext) -> Result<()> {
    let global = ctx.load_global().await?;
    let project = ProjectBuildConfig::load(ctx.project())?;

    println!("{}", "Project Configuration".bold());
    println!("Location: {}\n", ctx.project().display());
    for key in SettingKey::ALL {
        match project.get(key) {
            Some(value) => println!("  {key:<14}{value}"),
            None => println!("  {key:<14}{}", "(unset)".dimmed()),
        }
    }

    println!("\n{}", "Effective".bold());
    println!("  {:<14}{}", "build system", project.build_system());
    match project.build_file(&global.flags) {
        Some(file) if file.is_virtual() => println!("  {:<14}{}", "build file", "(virtual)".dimmed()),
        Some(file) => println!("  {:<14}{}", "build file", file.location().display()),
        None => println!("  {:<14}{}", "build file", "(none)".dimmed()),
    }
    match project.effective_sdk(&global).await {
        Some(sdk) => println!("  {:<14}{} ({})", "sdk", sdk.name(), sdk.install_root().display()),
        None => println!("  {:<14}{}", "sdk", "(none)".dimmed()),
    }
    Ok(())
}

async fn update(ctx: &CommandContext, key: SettingKey, value: Option<String>) -> Result<()> {
    let global = Arc::new(ctx.load_global().await?);
    let refresher = Arc::new(DependencyRefresher::new(Arc::clone(&global)));
    let mut project = ProjectBuildConfig::load(ctx.project())?.with_refresher(Arc::clone(&refresher));

    match &value {
        Some(value) => project.set_checked(key, value)?,
        None => project.set(key, None),
    }
    if key == SettingKey::AltSdk
        && let Some(name) = project.alt_sdk()
        && global.get_sdk(name).is_none()
    {
        println!("{} SDK '{name}' is not registered; the default SDK will be used", "Warning:".yellow());
    }

    if !project.is_dirty() {
        println!("Nothing changed");
        return Ok(());
    }
    project.save()?;
    refresher.wait_idle().await;

    match value {
        Some(value) => println!("✅ Set {} = {}", key.to_string().green(), value),
        None => println!("✅ Unset {}", key.to_string().green()),
    }
    Ok(())
}
