//! Builder and handle for the external tools hxdeps drives.
//!
//! Two kinds of processes are launched:
//!
//! - **Probes** (`haxe -version`, `neko`): short, blocking, bounded by a
//!   timeout, output captured whole. See [`ToolCommand::output_blocking`].
//! - **The installer** (`haxelib install`): long-running, output streamed
//!   line by line, waited on with a deadline and shut down with an explicit
//!   terminate-then-kill escalation. See [`ToolCommand::spawn`] and
//!   [`RunningProcess`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use hxdeps::process::ToolCommand;
//! use std::time::Duration;
//!
//! # fn example() -> anyhow::Result<()> {
//! let output = ToolCommand::new("haxe")
//!     .arg("-version")
//!     .output_blocking(Duration::from_secs(10))?;
//! println!("{}", output.combined());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Fluent builder for a tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// When set, replaces the inherited environment entirely.
    env: Option<HashMap<String, String>>,
    context: Option<String>,
}

impl ToolCommand {
    /// Start building an invocation of `program`.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            env: None,
            context: None,
        }
    }

    /// Add one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run with exactly this environment instead of inheriting the parent's.
    pub fn env_map(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Label used in log messages (typically the library name).
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The command line as a single string, for logs and error messages.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn log_start(&self) {
        match &self.context {
            Some(ctx) => tracing::debug!(target: "process", "({ctx}) Executing: {}", self.display()),
            None => tracing::debug!(target: "process", "Executing: {}", self.display()),
        }
    }

    fn std_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        if let Some(env) = &self.env {
            cmd.env_clear().envs(env);
        }
        cmd
    }

    /// Run to completion on the current thread, killing the process if it
    /// outlives `timeout`.
    ///
    /// Used for version probes, whose output is a few lines.
    pub fn output_blocking(self, timeout: Duration) -> Result<ToolOutput> {
        self.log_start();
        let mut child = self
            .std_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute {}", self.display()))?;

        let deadline = Instant::now() + timeout;
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    target: "process",
                    "Command timed out after {}s: {}",
                    timeout.as_secs(),
                    self.display()
                );
                let _ = child.kill();
                let _ = child.wait();
                anyhow::bail!("{} timed out after {}s", self.display(), timeout.as_secs());
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to collect output of {}", self.display()))?;
        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Spawn the process with stdout and stderr streamed as lines.
    pub fn spawn(self) -> Result<RunningProcess> {
        self.log_start();
        let mut cmd = Command::from(self.std_command());
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let mut child =
            cmd.spawn().with_context(|| format!("Failed to execute {}", self.display()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, tx);
        }

        Ok(RunningProcess {
            child,
            lines: rx,
            streams_open: true,
            command_line: self.display(),
        })
    }
}

fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

/// Captured result of a blocking invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit status
    pub status: ExitStatus,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr. Some tools print their banner on stderr.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }
}

/// Something observed while waiting on a [`RunningProcess`].
#[derive(Debug)]
pub enum ProcessEvent {
    /// One line of stdout or stderr
    Line(String),
    /// The process exited
    Exited(ExitStatus),
}

/// A spawned tool whose output arrives line by line.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    lines: mpsc::UnboundedReceiver<String>,
    streams_open: bool,
    command_line: String,
}

impl RunningProcess {
    /// The command line, for messages.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Wait for the next output line or the exit of the process.
    ///
    /// Cancel-safe: dropping the future loses nothing.
    pub async fn next_event(&mut self) -> Result<ProcessEvent> {
        loop {
            tokio::select! {
                biased;
                line = self.lines.recv(), if self.streams_open => match line {
                    Some(line) => return Ok(ProcessEvent::Line(line)),
                    None => self.streams_open = false,
                },
                status = self.child.wait() => {
                    return Ok(ProcessEvent::Exited(status?));
                }
            }
        }
    }

    /// Collect output lines still buffered after exit, waiting at most `limit`.
    pub async fn drain_lines(&mut self, limit: Duration) -> Vec<String> {
        let mut drained = Vec::new();
        if !self.streams_open {
            return drained;
        }
        let deadline = tokio::time::Instant::now() + limit;
        while let Ok(Some(line)) = tokio::time::timeout_at(deadline, self.lines.recv()).await {
            drained.push(line);
        }
        drained
    }

    /// Ask the process to exit (SIGTERM on Unix, forced kill elsewhere).
    pub fn terminate(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            if let Some(pid) = self.child.id() {
                let pid = libc::pid_t::try_from(pid).context("Process id out of range")?;
                // SAFETY: kill(2) has no memory-safety preconditions; the pid
                // belongs to a child we have not yet reaped.
                let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
                if rc != 0 {
                    return Err(std::io::Error::last_os_error())
                        .with_context(|| format!("Failed to terminate {}", self.command_line));
                }
            }
            Ok(())
        }
        #[cfg(not(unix))]
        {
            self.child.start_kill().with_context(|| format!("Failed to terminate {}", self.command_line))
        }
    }

    /// Forcefully kill the process and reap it.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await.with_context(|| format!("Failed to kill {}", self.command_line))
    }

    /// Terminate, allow `grace` for a cooperative exit, then kill.
    ///
    /// Returns the exit status if the process exited within the grace period.
    pub async fn shutdown(&mut self, grace: Duration) -> Result<Option<ExitStatus>> {
        if let Err(e) = self.terminate() {
            tracing::debug!(target: "process", "{e:#}");
        }
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => Ok(Some(status?)),
            Err(_) => {
                tracing::warn!(
                    target: "process",
                    "{} ignored termination request, killing it",
                    self.command_line
                );
                self.kill().await?;
                Ok(None)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_output_blocking_captures_both_streams() {
        let output = ToolCommand::new("/bin/sh")
            .args(["-c", "echo out; echo err >&2"])
            .output_blocking(Duration::from_secs(5))
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.combined(), "out\nerr\n");
    }

    #[test]
    fn test_output_blocking_times_out() {
        let result = ToolCommand::new("/bin/sh")
            .args(["-c", "sleep 5"])
            .output_blocking(Duration::from_millis(100));
        assert!(result.unwrap_err().to_string().contains("timed out"));
    }

    #[test]
    fn test_env_map_replaces_environment() {
        let mut env = HashMap::new();
        env.insert("HXDEPS_PROBE".to_string(), "42".to_string());
        let output = ToolCommand::new("/bin/sh")
            .args(["-c", "echo \"$HXDEPS_PROBE:$HOME\""])
            .env_map(env)
            .output_blocking(Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.stdout.trim(), "42:");
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        assert!(ToolCommand::new("/nonexistent/tool").spawn().is_err());
    }

    #[tokio::test]
    async fn test_spawn_streams_lines_then_exit() {
        let mut process =
            ToolCommand::new("/bin/sh").args(["-c", "echo one; echo two >&2; exit 3"]).spawn().unwrap();

        let mut lines = Vec::new();
        let status = loop {
            match process.next_event().await.unwrap() {
                ProcessEvent::Line(line) => lines.push(line),
                ProcessEvent::Exited(status) => break status,
            }
        };
        lines.extend(process.drain_lines(Duration::from_secs(1)).await);
        lines.sort();
        assert_eq!(lines, ["one", "two"]);
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_shutdown_terminates_cooperative_process() {
        let mut process = ToolCommand::new("/bin/sh").args(["-c", "sleep 30"]).spawn().unwrap();
        let status = process.shutdown(Duration::from_secs(5)).await.unwrap();
        assert!(status.is_some_and(|s| !s.success()));
    }

    #[tokio::test]
    async fn test_shutdown_kills_process_ignoring_sigterm() {
        let mut process = ToolCommand::new("/bin/sh")
            .args(["-c", "trap '' TERM; echo ready; while true; do sleep 1; done"])
            .spawn()
            .unwrap();
        // Wait until the trap is installed.
        loop {
            if let ProcessEvent::Line(line) = process.next_event().await.unwrap() {
                if line == "ready" {
                    break;
                }
            }
        }
        let status = process.shutdown(Duration::from_millis(300)).await.unwrap();
        assert!(status.is_none());
    }
}
