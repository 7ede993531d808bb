//! Background dependency refresh, one unit of work per project.
//!
//! Refreshes of the same project are serialized by a per-project async mutex;
//! refreshes of different projects run in parallel. The latest successful
//! [`Resolution`] of each project is kept and can be queried with
//! [`DependencyRefresher::latest`].
//!
//! A project without a usable SDK or without any build file is not an error
//! here: the user is warned once and the resolution is empty.

use crate::build_file::BuildSystem;
use crate::config::GlobalConfig;
use crate::core::HxError;
use crate::haxelib::Haxelib;
use crate::progress::{CancellationToken, LogProgress, ProgressSink};
use crate::project::ProjectBuildConfig;
use anyhow::Result;
use dashmap::{DashMap, DashSet};
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// An installed library as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLibrary {
    /// Library name
    pub name: String,
    /// Declared version, if any
    pub version: Option<String>,
    /// Installed directory
    pub location: PathBuf,
    /// Directory holding the library's sources
    pub source_dir: PathBuf,
    /// Whether a `.dev` override is in effect
    pub dev: bool,
}

impl From<&Haxelib> for ResolvedLibrary {
    fn from(library: &Haxelib) -> Self {
        Self {
            name: library.name().to_string(),
            version: library.version().map(str::to_string),
            location: library.location().to_path_buf(),
            source_dir: library.source_dir(),
            dev: library.is_dev_version(),
        }
    }
}

/// Everything known about a project's build after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Project directory
    pub project_root: PathBuf,
    /// Build system in effect
    pub build_system: BuildSystem,
    /// Build file in effect; `None` when the project has none
    pub build_file: Option<PathBuf>,
    /// Name of the SDK used, if one was available
    pub sdk: Option<String>,
    /// Absolute source paths, in declaration order
    pub source_paths: Vec<PathBuf>,
    /// Transitive library set, sorted by location
    pub libraries: Vec<ResolvedLibrary>,
}

impl Resolution {
    fn empty(project_root: &Path, build_system: BuildSystem) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            build_system,
            build_file: None,
            sdk: None,
            source_paths: Vec::new(),
            libraries: Vec::new(),
        }
    }
}

/// Runs and remembers project refreshes.
pub struct DependencyRefresher {
    config: Arc<GlobalConfig>,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    results: DashMap<PathBuf, Resolution>,
    warned: DashSet<PathBuf>,
    pending: StdMutex<Vec<JoinHandle<()>>>,
    token: CancellationToken,
}

impl DependencyRefresher {
    /// Refresher resolving SDKs and flags through `config`.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        Self {
            config,
            locks: DashMap::new(),
            results: DashMap::new(),
            warned: DashSet::new(),
            pending: StdMutex::new(Vec::new()),
            token: CancellationToken::new(),
        }
    }

    /// Token cancelling scheduled refreshes.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Resolve the project at `project_root` now and remember the result.
    ///
    /// Waits for any refresh of the same project that is already running.
    pub async fn refresh(&self, project_root: &Path, progress: &dyn ProgressSink) -> Result<Resolution> {
        let root = project_key(project_root);
        let lock = self.locks.entry(root.clone()).or_default().clone();
        let _guard = lock.lock().await;

        tracing::debug!(target: "refresh", "Refreshing {}", root.display());
        let resolution = self.resolve(&root, progress).await?;
        self.results.insert(root, resolution.clone());
        Ok(resolution)
    }

    async fn resolve(&self, root: &Path, progress: &dyn ProgressSink) -> Result<Resolution> {
        let project = ProjectBuildConfig::load(root)?;
        let build_system = project.build_system();

        let Some(build_file) = project.build_file(&self.config.flags) else {
            self.warn_once(
                root,
                &HxError::BuildFileNotFound {
                    project: root.display().to_string(),
                },
            );
            return Ok(Resolution::empty(root, build_system));
        };

        let sdk = project.effective_sdk(&self.config).await;
        let source_paths = build_file.absolute_source_paths()?;
        let libraries = match build_file.dependencies(sdk.as_ref(), progress).await {
            Ok(libraries) => {
                self.warned.remove(root);
                libraries
            }
            Err(e) => match e.downcast_ref::<HxError>() {
                Some(err) if matches!(err, HxError::SdkNotConfigured | HxError::SdkInvalid { .. }) => {
                    self.warn_once(root, err);
                    Default::default()
                }
                _ => return Err(e),
            },
        };

        Ok(Resolution {
            project_root: root.to_path_buf(),
            build_system,
            build_file: (!build_file.is_virtual()).then(|| build_file.location()),
            sdk: sdk.map(|sdk| sdk.name().to_string()),
            source_paths,
            libraries: libraries.iter().map(ResolvedLibrary::from).collect(),
        })
    }

    fn warn_once(&self, root: &Path, error: &HxError) {
        if self.warned.insert(root.to_path_buf()) {
            tracing::warn!(target: "refresh", "{}: {error}", root.display());
        } else {
            tracing::debug!(target: "refresh", "{}: {error}", root.display());
        }
    }

    /// Refresh `project_root` in the background.
    ///
    /// Outside a tokio runtime this only logs; nothing is scheduled.
    pub fn schedule(self: &Arc<Self>, project_root: &Path) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(target: "refresh", "No runtime, not refreshing {}", project_root.display());
            return;
        };

        let refresher = Arc::clone(self);
        let root = project_root.to_path_buf();
        let task = handle.spawn(async move {
            let progress = LogProgress::new(refresher.token.clone());
            if let Err(e) = refresher.refresh(&root, &progress).await {
                tracing::warn!(target: "refresh", "Refreshing {} failed: {e:#}", root.display());
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|task| !task.is_finished());
            pending.push(task);
        }
    }

    /// Wait for every scheduled refresh, including ones scheduled meanwhile.
    pub async fn wait_idle(&self) {
        loop {
            let tasks: Vec<_> = match self.pending.lock() {
                Ok(mut pending) => pending.drain(..).collect(),
                Err(_) => return,
            };
            if tasks.is_empty() {
                return;
            }
            for result in join_all(tasks).await {
                if let Err(e) = result {
                    tracing::warn!(target: "refresh", "Refresh task failed: {e}");
                }
            }
        }
    }

    /// Most recent resolution of `project_root`.
    #[must_use]
    pub fn latest(&self, project_root: &Path) -> Option<Resolution> {
        self.results.get(&project_key(project_root)).map(|entry| entry.value().clone())
    }
}

impl std::fmt::Debug for DependencyRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyRefresher")
            .field("projects", &self.locks.len())
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

fn project_key(project_root: &Path) -> PathBuf {
    std::fs::canonicalize(project_root).unwrap_or_else(|_| project_root.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LIX_LIBRARIES_DIR;
    use crate::test_utils::{LibraryFixture, RecordingProgress, write_file};
    use tempfile::TempDir;

    fn lix_project(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("game");
        let lib = LibraryFixture::new("tink_core").class_path("src").write_to(&temp.path().join("libs/tink_core"));
        write_file(&root.join("src/Main.hx"), "class Main {}");
        write_file(
            &root.join(LIX_LIBRARIES_DIR).join("tink_core.hxml"),
            &format!("-cp {}/src\n", lib.display()),
        );
        root
    }

    #[tokio::test]
    async fn test_refresh_stores_latest_resolution() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let refresher = DependencyRefresher::new(Arc::new(GlobalConfig::default()));

        let resolution = refresher.refresh(&root, &RecordingProgress::default()).await.unwrap();
        assert_eq!(resolution.build_system, BuildSystem::Lix);
        assert_eq!(resolution.build_file, None);
        assert_eq!(resolution.libraries.len(), 1);
        assert_eq!(resolution.libraries[0].name, "tink_core");
        assert_eq!(refresher.latest(&root), Some(resolution));
    }

    #[tokio::test]
    async fn test_missing_build_file_yields_empty_resolution() {
        let temp = TempDir::new().unwrap();
        let refresher = DependencyRefresher::new(Arc::new(GlobalConfig::default()));

        let resolution = refresher.refresh(temp.path(), &RecordingProgress::default()).await.unwrap();
        assert!(resolution.build_file.is_none());
        assert!(resolution.libraries.is_empty());
        assert!(resolution.source_paths.is_empty());

        refresher.refresh(temp.path(), &RecordingProgress::default()).await.unwrap();
        assert_eq!(refresher.warned.len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_default_sdk_yields_sources_only() {
        let temp = TempDir::new().unwrap();
        write_file(&temp.path().join("build.hxml"), "-cp src\n-lib format\n");
        let mut config = GlobalConfig::default();
        config.add_sdk("missing", temp.path().join("no-such-sdk"));
        config.set_default_sdk("missing").unwrap();
        let refresher = DependencyRefresher::new(Arc::new(config));

        let resolution = refresher.refresh(temp.path(), &RecordingProgress::default()).await.unwrap();
        assert_eq!(resolution.sdk.as_deref(), Some("missing"));
        assert_eq!(resolution.source_paths.len(), 1);
        assert!(resolution.libraries.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_scheduled_refreshes_complete() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let other = temp.path().join("other");
        write_file(&other.join("build.hxml"), "-cp src\n");
        let refresher = Arc::new(DependencyRefresher::new(Arc::new(GlobalConfig::default())));

        refresher.schedule(&root);
        refresher.schedule(&root);
        refresher.schedule(&other);
        refresher.wait_idle().await;

        assert_eq!(refresher.latest(&root).unwrap().libraries.len(), 1);
        assert_eq!(refresher.latest(&other).unwrap().build_system, BuildSystem::Hxml);
    }

    #[tokio::test]
    async fn test_save_schedules_refresh() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let refresher = Arc::new(DependencyRefresher::new(Arc::new(GlobalConfig::default())));

        let mut project = ProjectBuildConfig::load(&root).unwrap().with_refresher(Arc::clone(&refresher));
        project.set_auto_build(true);
        project.save().unwrap();
        refresher.wait_idle().await;

        assert!(refresher.latest(&root).is_some());
    }

    #[tokio::test]
    async fn test_revert_does_not_refresh() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let refresher = Arc::new(DependencyRefresher::new(Arc::new(GlobalConfig::default())));

        let mut project = ProjectBuildConfig::load(&root).unwrap().with_refresher(Arc::clone(&refresher));
        project.set_auto_build(true);
        project.revert();
        refresher.wait_idle().await;

        assert!(refresher.latest(&root).is_none());
    }
}
