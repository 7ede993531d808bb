//! Terminal progress indicator for CLI commands.
//!
//! [`SpinnerProgress`] wraps an `indicatif` spinner and implements
//! [`ProgressSink`], so the same resolution code that runs silently in the
//! background refresher shows live task names when driven from the terminal.
//!
//! # Environment Variables
//!
//! - `HXDEPS_NO_PROGRESS`: Set to any value to disable the spinner
//!
//! The CLI builds a [`SpinnerProgress::hidden`] instead when `--no-progress`
//! or `--quiet` is passed.

use crate::progress::{CancellationToken, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable disabling all progress output.
pub const NO_PROGRESS_VAR: &str = "HXDEPS_NO_PROGRESS";

/// Checks if progress indicators should be disabled.
fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_VAR).is_ok()
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// A spinner showing the current task, with failures printed above it.
#[derive(Clone)]
pub struct SpinnerProgress {
    bar: IndicatifBar,
    token: CancellationToken,
}

impl SpinnerProgress {
    /// Create a spinner observing `token` for cancellation.
    ///
    /// Returns a hidden spinner when progress is disabled.
    #[must_use]
    pub fn new(token: CancellationToken) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            bar,
            token,
        }
    }

    /// A spinner that never draws.
    #[must_use]
    pub fn hidden(token: CancellationToken) -> Self {
        Self {
            bar: IndicatifBar::hidden(),
            token,
        }
    }

    /// Stop the spinner and remove it from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for SpinnerProgress {
    fn set_task_name(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn report_failure(&self, subject: &str, error: &anyhow::Error) {
        tracing::warn!("{subject}: {error:#}");
        self.bar.suspend(|| eprintln!("warning: {subject}: {error:#}"));
    }
}

impl Drop for SpinnerProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
