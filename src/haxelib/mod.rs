//! Installed libraries: on-disk lookup, installation on demand, and the
//! transitive dependency closure.
//!
//! A library lives in the SDK's library cache in one of three shapes:
//!
//! ```text
//! <cache>/<name>/.dev          -> first line is a path to a local checkout
//! <cache>/<name>/.current      -> first line is the selected version
//! <cache>/<name>/<1,2,3>/      -> one directory per installed version,
//!                                 dots in the version replaced by commas
//! ```
//!
//! [`Haxelib::from`] looks in that order, runs `haxelib install` once if
//! nothing was found, and looks again.

pub mod closure;
pub mod installer;
pub mod manifest;

pub use closure::{DependencyWalk, LibraryLocator, SdkLocator};
pub use manifest::HaxelibManifest;

use crate::constants::{CURRENT_MARKER, DEV_MARKER};
use crate::core::HxError;
use crate::progress::ProgressSink;
use crate::toolchain::HaxeSdk;
use crate::utils::read_first_line;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// One resolved, installed library.
///
/// Identity, ordering, and hashing use the location only: two handles to the
/// same directory are the same library.
#[derive(Debug, Clone)]
pub struct Haxelib {
    location: PathBuf,
    meta: HaxelibManifest,
    dev_version: bool,
}

/// Where an install attempt stands while resolving a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallState {
    NotAttempted,
    Attempted,
}

impl Haxelib {
    /// Read the library rooted at `location`. Fails if its manifest is missing or invalid.
    pub fn at(location: impl Into<PathBuf>, dev_version: bool) -> Result<Self> {
        let location = location.into();
        let meta = HaxelibManifest::load(&location)?;
        Ok(Self {
            location,
            meta,
            dev_version,
        })
    }

    /// Library root directory.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Parsed `haxelib.json`.
    #[must_use]
    pub fn meta(&self) -> &HaxelibManifest {
        &self.meta
    }

    /// Name declared in the manifest.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Version declared in the manifest.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.meta.version.as_deref()
    }

    /// Whether the location came from a `.dev` redirect.
    #[must_use]
    pub fn is_dev_version(&self) -> bool {
        self.dev_version
    }

    /// Directory holding the library's sources (`classPath`, else the root).
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        match self.meta.class_path.as_deref().map(str::trim) {
            Some(class_path) if !class_path.is_empty() => self.location.join(class_path),
            _ => self.location.clone(),
        }
    }

    /// Declared dependencies as `(name, version)`, in name order.
    /// An empty constraint is reported as `None`.
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.meta.dependencies.iter().map(|(name, version)| {
            let version = version.trim();
            (name.as_str(), (!version.is_empty()).then_some(version))
        })
    }

    /// Look for an installed copy without installing anything.
    ///
    /// Returns `Ok(None)` when no candidate directory exists, and an error when
    /// a directory exists but its manifest cannot be read.
    pub fn find_installed(sdk: &HaxeSdk, name: &str, version: Option<&str>) -> Result<Option<Self>> {
        let library_dir = sdk.library_cache_dir().join(name);

        match version {
            None => {
                if let Some(target) = read_first_line(&library_dir.join(DEV_MARKER)) {
                    let target = library_dir.join(target);
                    if target.exists() {
                        tracing::debug!(target: "haxelib", "{name}: dev checkout at {}", target.display());
                        return Self::at(target, true).map(Some);
                    }
                    tracing::debug!(target: "haxelib", "{name}: ignoring stale dev marker -> {}", target.display());
                }
                if let Some(current) = read_first_line(&library_dir.join(CURRENT_MARKER)) {
                    let dir = library_dir.join(versioned_dir_name(&current));
                    if dir.is_dir() {
                        return Self::at(dir, false).map(Some);
                    }
                }
            }
            Some(version) => {
                let dir = library_dir.join(versioned_dir_name(version));
                if dir.is_dir() {
                    return Self::at(dir, false).map(Some);
                }
            }
        }
        Ok(None)
    }

    /// Resolve a library, installing it with `haxelib install` if it is not on disk.
    ///
    /// The installer runs at most once. If it reports success but the library
    /// still cannot be found, the result is [`HxError::LibraryNotInstalled`].
    pub async fn from(
        sdk: &HaxeSdk,
        name: &str,
        version: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> Result<Self> {
        let mut state = InstallState::NotAttempted;
        loop {
            if let Some(library) = Self::find_installed(sdk, name, version)
                .with_context(|| format!("Failed to read installed library '{name}'"))?
            {
                return Ok(library);
            }
            match state {
                InstallState::NotAttempted => {
                    if progress.is_cancelled() {
                        return Err(HxError::Cancelled.into());
                    }
                    installer::install(sdk, name, version, progress).await?;
                    state = InstallState::Attempted;
                }
                InstallState::Attempted => {
                    return Err(HxError::LibraryNotInstalled {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

/// Directory name of an installed version: `1.2.3` is stored as `1,2,3`.
#[must_use]
pub fn versioned_dir_name(version: &str) -> String {
    version.trim().replace('.', ",")
}

impl PartialEq for Haxelib {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Haxelib {}

impl PartialOrd for Haxelib {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Haxelib {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

impl Hash for Haxelib {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

impl fmt::Display for Haxelib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.version(), self.dev_version) {
            (_, true) => write!(f, "{} (dev)", self.name()),
            (Some(version), false) => write!(f, "{}:{version}", self.name()),
            (None, false) => write!(f, "{}", self.name()),
        }
    }
}
