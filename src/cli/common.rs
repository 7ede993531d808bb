//! State shared by every subcommand.

use crate::config::GlobalConfig;
use crate::progress::CancellationToken;
use crate::utils::progress::SpinnerProgress;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;

/// Where a command runs and how it reports.
#[derive(Debug, Clone)]
pub struct CommandContext {
    project: PathBuf,
    config_path: Option<PathBuf>,
    no_progress: bool,
}

impl CommandContext {
    /// Context for `project`, reading the global configuration from
    /// `config_path` (the default location when `None`).
    #[must_use]
    pub const fn new(project: PathBuf, config_path: Option<PathBuf>, no_progress: bool) -> Self {
        Self {
            project,
            config_path,
            no_progress,
        }
    }

    /// Project directory.
    #[must_use]
    pub fn project(&self) -> &Path {
        &self.project
    }

    /// Global configuration file in effect.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => GlobalConfig::default_path(),
        }
    }

    /// Load the global configuration; a missing file yields the defaults.
    pub async fn load_global(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone()).await
    }

    /// Persist the global configuration.
    pub async fn save_global(&self, config: &GlobalConfig) -> Result<()> {
        config.save_to(&self.config_path()?).await
    }

    /// A spinner wired to a fresh cancellation token.
    #[must_use]
    pub fn progress(&self) -> (SpinnerProgress, CancellationToken) {
        let token = CancellationToken::new();
        let progress = if self.no_progress {
            SpinnerProgress::hidden(token.clone())
        } else {
            SpinnerProgress::new(token.clone())
        };
        (progress, token)
    }
}

/// Cancel `token` on Ctrl-C. Abort the returned task once the work is done.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Cancelling...");
            token.cancel();
        }
    })
}
