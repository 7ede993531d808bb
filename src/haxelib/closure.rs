//! Transitive dependency closure over declared `haxelib.json` dependencies.
//!
//! The walk is breadth-first and keyed by library name. A name is resolved
//! once, at the shallowest level it is declared, with the version constraint
//! declared there ("closest wins"). No compatibility check is made between
//! constraints declared at different levels. The root library and any names
//! the caller excludes are never part of the result, which also stops cycles
//! that lead back to the root.
//!
//! How a `(name, version)` pair becomes an installed [`Haxelib`] is the
//! [`LibraryLocator`]'s business: the SDK cache with install-on-demand for
//! most projects, lockfiles for lix-managed ones.

use super::Haxelib;
use crate::core::HxError;
use crate::progress::ProgressSink;
use crate::toolchain::HaxeSdk;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::path::PathBuf;

/// Turns a library reference into an installed library.
pub trait LibraryLocator: Send + Sync {
    /// Locate (and if needed install) `name` at `version`.
    fn locate(
        &self,
        name: &str,
        version: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> impl Future<Output = Result<Haxelib>> + Send;
}

/// Resolves through an SDK's library cache, installing missing libraries.
#[derive(Debug, Clone)]
pub struct SdkLocator {
    sdk: HaxeSdk,
}

impl SdkLocator {
    /// Locator backed by `sdk`.
    #[must_use]
    pub const fn new(sdk: HaxeSdk) -> Self {
        Self {
            sdk,
        }
    }
}

impl LibraryLocator for SdkLocator {
    async fn locate(
        &self,
        name: &str,
        version: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<Haxelib> {
        Haxelib::from(&self.sdk, name, version, progress).await
    }
}

/// One pending breadth-first walk.
#[derive(Debug, Default)]
pub struct DependencyWalk {
    seeds: Vec<Haxelib>,
    excluded_names: HashSet<String>,
    excluded_locations: HashSet<PathBuf>,
}

impl DependencyWalk {
    /// Closure of a single library, excluding the library itself.
    #[must_use]
    pub fn from_root(root: &Haxelib) -> Self {
        let mut walk = Self {
            seeds: vec![root.clone()],
            ..Self::default()
        };
        walk.excluded_names.insert(root.name().to_string());
        walk.excluded_locations.insert(root.location().to_path_buf());
        walk
    }

    /// Closure of a project's direct dependencies, which are part of the result.
    #[must_use]
    pub fn from_direct(direct: impl IntoIterator<Item = Haxelib>) -> Self {
        Self {
            seeds: direct.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Never include a library with this name, nor walk into it.
    #[must_use]
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.insert(name.into());
        self
    }

    /// Never include the library at this location, nor walk into it.
    #[must_use]
    pub fn exclude_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.excluded_locations.insert(location.into());
        self
    }

    /// Run the walk.
    ///
    /// A dependency that cannot be located is reported to `progress` and
    /// skipped; its siblings still resolve. Cancellation is checked before
    /// each resolution and ends the walk with [`HxError::Cancelled`].
    pub async fn run<L: LibraryLocator>(
        self,
        locator: &L,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<Haxelib>> {
        let Self {
            seeds,
            excluded_names,
            excluded_locations,
        } = self;
        let is_excluded = |library: &Haxelib| {
            excluded_names.contains(library.name()) || excluded_locations.contains(library.location())
        };

        // Name -> level at which it was settled. Seeds are level 0 when the
        // walk starts from a root and level 1 when they are direct dependencies.
        let mut levels: HashMap<String, usize> = HashMap::new();
        let mut resolved: BTreeSet<Haxelib> = BTreeSet::new();
        let mut queue: VecDeque<(Haxelib, usize)> = VecDeque::new();

        for seed in seeds {
            if excluded_locations.contains(seed.location()) {
                queue.push_back((seed, 0));
                continue;
            }
            if is_excluded(&seed) || levels.contains_key(seed.name()) {
                continue;
            }
            levels.insert(seed.name().to_string(), 1);
            resolved.insert(seed.clone());
            queue.push_back((seed, 1));
        }

        while let Some((library, level)) = queue.pop_front() {
            for (name, version) in library.dependencies() {
                if excluded_names.contains(name) || levels.contains_key(name) {
                    continue;
                }
                // Settle the name now so a deeper declaration, or a failure,
                // is not retried.
                levels.insert(name.to_string(), level + 1);

                if progress.is_cancelled() {
                    return Err(HxError::Cancelled.into());
                }
                progress.set_task_name(&format!("Resolving {name}"));

                match locator.locate(name, version, progress).await {
                    Ok(dependency) if is_excluded(&dependency) => {}
                    Ok(dependency) => {
                        tracing::trace!(
                            target: "haxelib",
                            "{name} (level {}) -> {}",
                            level + 1,
                            dependency.location().display()
                        );
                        if resolved.insert(dependency.clone()) {
                            queue.push_back((dependency, level + 1));
                        }
                    }
                    Err(e) if is_cancellation(&e) => return Err(e),
                    Err(e) => {
                        progress.report_failure(&format!("Dependency '{name}' of {}", library.name()), &e);
                    }
                }
            }
        }

        Ok(resolved)
    }
}

pub(crate) fn is_cancellation(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<HxError>(), Some(HxError::Cancelled))
}
