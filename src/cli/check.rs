//! `hxdeps check`: feed changed paths to the file-change dispatch.
//!
//! Meant to be called from editor hooks or a file watcher:
//!
//! ```bash
//! hxdeps check build.hxml src/Main.hx
//! hxdeps check --kind removed haxe_libraries/format.hxml
//! ```

use super::common::CommandContext;
use crate::refresh::DependencyRefresher;
use crate::watch::{ChangeKind, FileChange, dispatch};
use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

/// Refresh the project if any of the changed files affect its build.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Changed files, absolute or relative to the project
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// What happened to the files
    #[arg(long, value_enum, default_value_t = KindArg::Changed)]
    kind: KindArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    Added,
    Changed,
    Removed,
}

impl From<KindArg> for ChangeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Added => Self::Added,
            KindArg::Changed => Self::Changed,
            KindArg::Removed => Self::Removed,
        }
    }
}

impl CheckCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let changes: Vec<FileChange> =
            self.paths.into_iter().map(|path| FileChange::new(path, self.kind.into())).collect();

        let global = Arc::new(ctx.load_global().await?);
        let refresher = Arc::new(DependencyRefresher::new(global));
        if !dispatch(&refresher, ctx.project(), &changes) {
            println!("No build inputs changed");
            return Ok(());
        }

        refresher.wait_idle().await;
        match refresher.latest(ctx.project()) {
            Some(resolution) => println!(
                "Refreshed: {} source path(s), {} librar{}",
                resolution.source_paths.len(),
                resolution.libraries.len(),
                if resolution.libraries.len() == 1 { "y" } else { "ies" }
            ),
            None => anyhow::bail!("Refreshing {} failed", ctx.project().display()),
        }
        Ok(())
    }
}
