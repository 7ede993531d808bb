//! Deciding whether a batch of file changes affects a project's build.
//!
//! hxdeps does not watch the filesystem itself. Whatever does (an editor, a
//! `notify` loop, the `check` subcommand) hands over the changed paths and
//! [`dispatch`] schedules a refresh when any of them matters.

use crate::build_file::is_build_related;
use crate::refresh::DependencyRefresher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Created
    Added,
    /// Content or metadata modified
    Changed,
    /// Deleted
    Removed,
}

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
    /// Path of the file, absolute or relative to the project root
    pub path: PathBuf,
    /// Kind of change
    pub kind: ChangeKind,
}

impl FileChange {
    /// A change of `kind` to `path`.
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Whether any change is a build file, manifest, or lockfile inside `project_root`.
#[must_use]
pub fn is_relevant_change(project_root: &Path, changes: &[FileChange]) -> bool {
    changes.iter().any(|change| {
        let path = if change.path.is_absolute() {
            change.path.clone()
        } else {
            project_root.join(&change.path)
        };
        let Ok(relative) = path.strip_prefix(project_root) else {
            return false;
        };
        // `.hxdeps/` holds project settings, not build inputs.
        let in_state_dir = relative
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == crate::project::settings::SETTINGS_DIR);
        !in_state_dir && is_build_related(relative)
    })
}

/// Schedule a refresh of `project_root` if the batch is relevant.
///
/// Returns whether a refresh was scheduled.
pub fn dispatch(refresher: &Arc<DependencyRefresher>, project_root: &Path, changes: &[FileChange]) -> bool {
    if !is_relevant_change(project_root, changes) {
        tracing::trace!(target: "refresh", "{} irrelevant change(s) in {}", changes.len(), project_root.display());
        return false;
    }
    tracing::debug!(target: "refresh", "Build inputs of {} changed", project_root.display());
    refresher.schedule(project_root);
    true
}
