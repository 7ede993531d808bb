//! Progress reporting and cooperative cancellation for resolution work.
//!
//! Every long-running operation (library resolution, `haxelib install`, a
//! project refresh) receives a `&dyn ProgressSink`. The sink is where the
//! operation:
//!
//! - announces what it is doing ([`ProgressSink::set_task_name`]),
//! - learns whether it should stop ([`ProgressSink::is_cancelled`]),
//! - reports a failure that was handled locally and did not abort the
//!   operation ([`ProgressSink::report_failure`]), e.g. one library out of
//!   ten that could not be resolved.
//!
//! Cancellation is cooperative: resolution loops poll the sink between
//! libraries and the installer wait loop polls it on a fixed interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receiver of progress updates, cancellation checks, and non-fatal failures.
pub trait ProgressSink: Send + Sync {
    /// Update the human-readable name of the current task.
    fn set_task_name(&self, name: &str);

    /// Whether the operation should stop at the next opportunity.
    fn is_cancelled(&self) -> bool;

    /// Report a failure that was handled without aborting the operation.
    fn report_failure(&self, subject: &str, error: &anyhow::Error) {
        tracing::warn!("{subject}: {error:#}");
    }
}

/// Shared cancellation flag.
///
/// Clones share the same flag, so a token can be handed to a Ctrl-C handler
/// while the resolution code polls another clone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A sink that only logs, used for background work without a UI.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    token: CancellationToken,
}

impl LogProgress {
    /// Create a sink observing the given cancellation token.
    #[must_use]
    pub const fn new(token: CancellationToken) -> Self {
        Self {
            token,
        }
    }
}

impl ProgressSink for LogProgress {
    fn set_task_name(&self, name: &str) {
        tracing::debug!(target: "progress", "{name}");
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
