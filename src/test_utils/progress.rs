//! A progress sink that records what it was told.

use crate::progress::{CancellationToken, ProgressSink};
use std::sync::{Arc, Mutex};

/// Records task names and failures; clones share their records.
#[derive(Clone, Debug, Default)]
pub struct RecordingProgress {
    tasks: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<String>>>,
    token: CancellationToken,
}

impl RecordingProgress {
    /// Every task name set so far.
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.lock().expect("tasks lock").clone()
    }

    /// `"<subject>: <error>"` for every reported failure.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().expect("failures lock").clone()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl ProgressSink for RecordingProgress {
    fn set_task_name(&self, name: &str) {
        self.tasks.lock().expect("tasks lock").push(name.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn report_failure(&self, subject: &str, error: &anyhow::Error) {
        self.failures.lock().expect("failures lock").push(format!("{subject}: {error:#}"));
    }
}
