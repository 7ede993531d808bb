//! Runs `haxelib install` for a missing library.
//!
//! The installer is the only long-running subprocess. Its output is streamed
//! to the progress sink line by line and the last few lines are kept for the
//! error message. Waiting is bounded: on timeout or cancellation the process
//! is asked to terminate, given a grace period, and then killed.

use crate::constants::{
    INSTALLER_GRACE_PERIOD, INSTALLER_OUTPUT_LINES, INSTALLER_POLL_INTERVAL, INSTALLER_TIMEOUT,
};
use crate::core::HxError;
use crate::process::{ProcessEvent, RunningProcess, ToolCommand};
use crate::progress::ProgressSink;
use crate::toolchain::HaxeSdk;
use crate::utils::platform::current_env;
use anyhow::Result;
use std::collections::VecDeque;
use std::process::ExitStatus;
use std::time::Duration;

/// Time limits applied to one installer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallerLimits {
    /// Upper bound on the whole run
    pub timeout: Duration,
    /// Time between termination request and kill
    pub grace_period: Duration,
    /// How often cancellation and the deadline are checked
    pub poll_interval: Duration,
}

impl Default for InstallerLimits {
    fn default() -> Self {
        Self {
            timeout: INSTALLER_TIMEOUT,
            grace_period: INSTALLER_GRACE_PERIOD,
            poll_interval: INSTALLER_POLL_INTERVAL,
        }
    }
}

/// Rolling buffer of the most recent output lines.
#[derive(Debug)]
struct OutputTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl OutputTail {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

enum Outcome {
    Exited(ExitStatus),
    Cancelled,
    TimedOut,
}

/// Install `name` (optionally at `version`) with the SDK's `haxelib`.
pub async fn install(
    sdk: &HaxeSdk,
    name: &str,
    version: Option<&str>,
    progress: &dyn ProgressSink,
) -> Result<()> {
    install_with(sdk, name, version, progress, InstallerLimits::default()).await
}

/// [`install`] with explicit time limits.
pub async fn install_with(
    sdk: &HaxeSdk,
    name: &str,
    version: Option<&str>,
    progress: &dyn ProgressSink,
    limits: InstallerLimits,
) -> Result<()> {
    let label = match version {
        Some(version) => format!("{name}:{version}"),
        None => name.to_string(),
    };

    let mut env = current_env();
    sdk.configure_environment(&mut env)?;

    let mut args = vec!["install".to_string(), name.to_string()];
    args.extend(version.map(str::to_string));
    args.push("--always".to_string());

    tracing::info!(target: "installer", "Installing {label} with {}", sdk.name());
    progress.set_task_name(&format!("Installing {label}"));

    let mut process = ToolCommand::new(sdk.haxelib_executable())
        .args(args)
        .current_dir(sdk.install_root())
        .env_map(env)
        .with_context(&label)
        .spawn()?;

    let mut tail = OutputTail::new(INSTALLER_OUTPUT_LINES);
    let outcome = wait(&mut process, &mut tail, progress, limits).await?;

    match outcome {
        Outcome::Exited(status) => {
            for line in process.drain_lines(limits.poll_interval).await {
                tail.push(line);
            }
            if status.success() {
                tracing::debug!(target: "installer", "Installed {label}");
                Ok(())
            } else {
                Err(HxError::InstallerFailed {
                    library: label,
                    status: status.to_string(),
                    output: tail.render(),
                }
                .into())
            }
        }
        Outcome::Cancelled => {
            tracing::info!(target: "installer", "Cancelled installation of {label}");
            stop(&mut process, limits).await;
            Err(HxError::Cancelled.into())
        }
        Outcome::TimedOut => {
            tracing::warn!(
                target: "installer",
                "Installation of {label} exceeded {}s",
                limits.timeout.as_secs()
            );
            stop(&mut process, limits).await;
            Err(HxError::InstallerTimedOut {
                library: label,
                seconds: limits.timeout.as_secs(),
                output: tail.render(),
            }
            .into())
        }
    }
}

async fn wait(
    process: &mut RunningProcess,
    tail: &mut OutputTail,
    progress: &dyn ProgressSink,
    limits: InstallerLimits,
) -> Result<Outcome> {
    let deadline = tokio::time::Instant::now() + limits.timeout;
    let mut ticker = tokio::time::interval(limits.poll_interval);
    loop {
        tokio::select! {
            event = process.next_event() => match event? {
                ProcessEvent::Line(line) => {
                    let line = line.trim_end().to_string();
                    if !line.is_empty() {
                        progress.set_task_name(&line);
                        tail.push(line);
                    }
                }
                ProcessEvent::Exited(status) => return Ok(Outcome::Exited(status)),
            },
            _ = ticker.tick() => {
                if progress.is_cancelled() {
                    return Ok(Outcome::Cancelled);
                }
                if tokio::time::Instant::now() >= deadline {
                    return Ok(Outcome::TimedOut);
                }
            }
        }
    }
}

async fn stop(process: &mut RunningProcess, limits: InstallerLimits) {
    if let Err(e) = process.shutdown(limits.grace_period).await {
        tracing::warn!(target: "installer", "Failed to stop {}: {e:#}", process.command_line());
    }
}
