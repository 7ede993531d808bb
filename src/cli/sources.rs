//! `hxdeps sources`: one source path per line, for scripts and editors.

use super::common::CommandContext;
use crate::hxml::FlagSet;
use crate::project::ProjectBuildConfig;
use anyhow::Result;
use clap::Args;

/// Print the project's source paths.
#[derive(Args, Debug)]
pub struct SourcesCommand {
    /// Print paths as written in the build file instead of absolute
    #[arg(long)]
    relative: bool,
}

impl SourcesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let global = ctx.load_global().await?;
        let project = ProjectBuildConfig::load(ctx.project())?;
        let flags: &FlagSet = &global.flags;

        let Some(build_file) = project.build_file(flags) else {
            tracing::warn!("No build file found in {}", ctx.project().display());
            return Ok(());
        };

        let paths = if self.relative {
            build_file.source_paths()?
        } else {
            build_file.absolute_source_paths()?
        };
        for path in paths {
            println!("{}", path.display());
        }
        Ok(())
    }
}
