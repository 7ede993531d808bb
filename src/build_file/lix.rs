//! Projects whose libraries are pinned by lix lockfiles.
//!
//! Every dependency has a lockfile `haxe_libraries/<name>.hxml` in the
//! project. Its class path points into the shared lix download cache:
//!
//! ```text
//! # @install: lix --silent download "haxelib:/tink_core#2.1.0" into tink_core/2.1.0/haxelib
//! -cp ${HAXE_LIBCACHE}/tink_core/2.1.0/haxelib/src
//! -D tink_core=2.1.0
//! ```
//!
//! The library root is the nearest directory at or above that class path
//! that holds a `haxelib.json`. Libraries are expected to be downloaded
//! already; nothing is installed from here.

use super::hxml::HxmlFile;
use crate::constants::{HAXELIB_MANIFEST, LIX_LIBCACHE_VAR, LIX_LIBRARIES_DIR, LIX_SCOPE_VAR};
use crate::core::HxError;
use crate::haxelib::{Haxelib, LibraryLocator};
use crate::hxml::{FlagSet, tokenize_file};
use crate::progress::ProgressSink;
use anyhow::Result;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// An argument file in a lix-managed project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LixFile {
    hxml: HxmlFile,
}

impl LixFile {
    /// Argument file at `location` belonging to the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, location: impl Into<PathBuf>, flags: FlagSet) -> Self {
        Self {
            hxml: HxmlFile::new(project_root, location, flags),
        }
    }

    /// The underlying argument file.
    #[must_use]
    pub const fn hxml(&self) -> &HxmlFile {
        &self.hxml
    }

    /// Names referenced with `-lib`. Inline versions are ignored: the lockfile decides.
    #[must_use]
    pub fn library_names(&self) -> Vec<String> {
        self.hxml.library_specs().into_iter().map(|spec| spec.name).collect()
    }

    /// Locator reading this project's lockfiles.
    #[must_use]
    pub fn locator(&self) -> LixLocator {
        LixLocator::new(self.hxml.project_root(), self.hxml.flags().clone())
    }
}

/// Directory substituted for `${HAXE_LIBCACHE}`: the environment variable,
/// else `~/haxe/haxe_libraries`.
#[must_use]
pub fn lix_libcache_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(LIX_LIBCACHE_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join("haxe").join(LIX_LIBRARIES_DIR))
}

/// Resolves libraries through `haxe_libraries/<name>.hxml`.
#[derive(Debug, Clone)]
pub struct LixLocator {
    project_root: PathBuf,
    libcache: Option<PathBuf>,
    flags: FlagSet,
}

impl LixLocator {
    /// Locator for the project at `project_root`, using the default download cache.
    pub fn new(project_root: impl Into<PathBuf>, flags: FlagSet) -> Self {
        Self {
            project_root: project_root.into(),
            libcache: lix_libcache_dir(),
            flags,
        }
    }

    /// Use `libcache` for `${HAXE_LIBCACHE}` instead of the default.
    #[must_use]
    pub fn with_libcache(mut self, libcache: impl Into<PathBuf>) -> Self {
        self.libcache = Some(libcache.into());
        self
    }

    /// Path of the lockfile for `name`.
    #[must_use]
    pub fn lockfile(&self, name: &str) -> PathBuf {
        self.project_root.join(LIX_LIBRARIES_DIR).join(format!("{name}.hxml"))
    }

    /// Replace `${HAXE_LIBCACHE}` and `${SCOPE_DIR}` in a lockfile path.
    /// Other variables are left untouched.
    #[must_use]
    pub fn expand<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let libcache = self.libcache.as_deref().map(|p| p.to_string_lossy().into_owned());
        let scope = self.project_root.to_string_lossy().into_owned();
        shellexpand::env_with_context_no_errors(value, |var: &str| match var {
            LIX_LIBCACHE_VAR => libcache.clone(),
            LIX_SCOPE_VAR => Some(scope.clone()),
            _ => None,
        })
    }

    /// Synchronous lookup behind [`LibraryLocator::locate`].
    pub fn locate_now(&self, name: &str) -> Result<Haxelib> {
        let not_found = |reason: String| HxError::LibraryNotFound {
            name: name.to_string(),
            reason,
        };

        let lockfile = self.lockfile(name);
        if !lockfile.is_file() {
            return Err(not_found(format!("no lockfile {}", lockfile.display())).into());
        }
        let tokens = tokenize_file(&lockfile);
        let Some(class_path) = self.flags.class_paths(&tokens).first().copied() else {
            return Err(not_found(format!("{} declares no class path", lockfile.display())).into());
        };

        let expanded = PathBuf::from(self.expand(class_path).as_ref());
        let class_path = if expanded.is_absolute() { expanded } else { self.project_root.join(expanded) };

        let root = class_path
            .ancestors()
            .find(|dir| dir.join(HAXELIB_MANIFEST).is_file())
            .ok_or_else(|| not_found(format!("no {HAXELIB_MANIFEST} at or above {}", class_path.display())))?;

        tracing::trace!(target: "build_file", "lix {name} -> {}", root.display());
        Haxelib::at(root, false)
    }
}

impl LibraryLocator for LixLocator {
    async fn locate(&self, name: &str, _version: Option<&str>, _progress: &dyn ProgressSink) -> Result<Haxelib> {
        self.locate_now(name)
    }
}

/// Whether `dir` is a lix-managed project.
#[must_use]
pub fn has_lockfiles(dir: &Path) -> bool {
    dir.join(LIX_LIBRARIES_DIR).is_dir()
}
