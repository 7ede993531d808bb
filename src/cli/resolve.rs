//! `hxdeps resolve`: the project's build as hxdeps sees it.

use super::common::{CommandContext, cancel_on_ctrl_c};
use crate::refresh::{DependencyRefresher, Resolution};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

/// Resolve source paths and the transitive library set.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Print the resolution as JSON
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let resolution = resolve_project(ctx).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolution).context("Failed to serialize resolution")?);
        } else {
            print_resolution(&resolution);
        }
        Ok(())
    }
}

/// Run one refresh of the context's project with a spinner and Ctrl-C handling.
pub(super) async fn resolve_project(ctx: &CommandContext) -> Result<Resolution> {
    let global = Arc::new(ctx.load_global().await?);
    let refresher = DependencyRefresher::new(global);
    let (progress, token) = ctx.progress();
    let ctrl_c = cancel_on_ctrl_c(token);

    let result = refresher.refresh(ctx.project(), &progress).await;
    ctrl_c.abort();
    progress.finish();
    result
}

fn print_resolution(resolution: &Resolution) {
    let label = |name: &str| format!("{name:<14}").bold();

    println!("{}{}", label("Build system"), resolution.build_system);
    match &resolution.build_file {
        Some(file) => println!("{}{}", label("Build file"), file.display()),
        None => println!("{}{}", label("Build file"), "(none)".dimmed()),
    }
    println!("{}{}", label("SDK"), resolution.sdk.as_deref().unwrap_or("(none)"));

    println!("\n{}", "Source paths:".bold());
    for path in &resolution.source_paths {
        println!("  {}", path.display());
    }

    println!("\n{}", "Libraries:".bold());
    if resolution.libraries.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for library in &resolution.libraries {
        let version = match (&library.version, library.dev) {
            (_, true) => "dev".yellow().to_string(),
            (Some(version), false) => version.clone(),
            (None, false) => String::new(),
        };
        println!("  {} {} {}", library.name.green(), version, library.location.display().to_string().dimmed());
    }
}
