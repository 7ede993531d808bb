//! A Haxe SDK: compiler, `haxelib`, standard library, and library cache.

use super::neko::NekoVm;
use super::probe::{ProbeCache, parse_haxe_version, probe_for};
use crate::constants::{ENV_HAXE_STD_PATH, ENV_HAXELIB_PATH, ENV_HAXEPATH};
use crate::core::HxError;
use crate::utils::executable_name;
use crate::utils::platform::prepend_to_path;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A Haxe installation identified by its install root.
///
/// Validity and version come from running `haxe -version`; the result is
/// cached per executable and shared by every `HaxeSdk` pointing at the same
/// install.
#[derive(Clone)]
pub struct HaxeSdk {
    name: String,
    install_root: PathBuf,
    neko: Option<NekoVm>,
    probe: Arc<ProbeCache>,
}

impl HaxeSdk {
    /// Handle for the SDK in `install_root`, registered as `name`.
    pub fn new(name: impl Into<String>, install_root: impl Into<PathBuf>) -> Self {
        let install_root = install_root.into();
        let probe =
            probe_for(&install_root.join(executable_name("haxe")), &["-version"], parse_haxe_version);
        Self {
            name: name.into(),
            install_root,
            neko: None,
            probe,
        }
    }

    /// Use this Neko instead of discovering one.
    #[must_use]
    pub fn with_neko(mut self, neko: NekoVm) -> Self {
        self.neko = Some(neko);
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory containing `haxe` and `haxelib`.
    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Path of the compiler executable.
    #[must_use]
    pub fn compiler_executable(&self) -> PathBuf {
        self.install_root.join(executable_name("haxe"))
    }

    /// Path of the library installer executable.
    #[must_use]
    pub fn haxelib_executable(&self) -> PathBuf {
        self.install_root.join(executable_name("haxelib"))
    }

    /// Repository `haxelib` installs into: `HAXELIB_PATH`, else `<root>/lib`.
    #[must_use]
    pub fn library_cache_dir(&self) -> PathBuf {
        env_dir(ENV_HAXELIB_PATH).unwrap_or_else(|| self.install_root.join("lib"))
    }

    /// Standard library sources: `HAXE_STD_PATH`, else `<root>/std`.
    #[must_use]
    pub fn std_lib_dir(&self) -> PathBuf {
        env_dir(ENV_HAXE_STD_PATH).unwrap_or_else(|| self.install_root.join("std"))
    }

    /// Compiler version, `None` when the SDK is not a working installation.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.probe.get()
    }

    /// Whether the compiler exists, is executable, and reports a version.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.version().is_some()
    }

    /// [`version`](Self::version) for async callers.
    ///
    /// A stale probe spawns `haxe` and waits for it, so that runs on the
    /// blocking pool instead of a runtime worker.
    pub async fn probe_version(&self) -> Option<String> {
        if self.probe.is_fresh() {
            return self.probe.get();
        }
        let probe = Arc::clone(&self.probe);
        tokio::task::spawn_blocking(move || probe.get()).await.unwrap_or_else(|e| {
            tracing::debug!(target: "toolchain", "Probe task failed: {e}");
            None
        })
    }

    /// Fail with [`HxError::SdkInvalid`] unless the SDK reports a version.
    pub async fn ensure_valid(&self) -> Result<()> {
        if self.probe_version().await.is_some() {
            Ok(())
        } else {
            Err(HxError::SdkInvalid {
                path: self.install_root.display().to_string(),
            }
            .into())
        }
    }

    /// The Neko VM `haxelib` will run on.
    ///
    /// An explicitly configured VM wins, then a `neko` directory next to the
    /// install root (the layout of the official installers), then discovery.
    #[must_use]
    pub fn neko_vm(&self) -> Option<NekoVm> {
        if let Some(neko) = &self.neko {
            return Some(neko.clone());
        }
        if let Some(parent) = self.install_root.parent() {
            let sibling = NekoVm::new(parent.join("neko"));
            if sibling.is_present() {
                return Some(sibling);
            }
        }
        super::discover_neko()
    }

    /// Prepare an environment for running this SDK's tools.
    ///
    /// Puts the SDK and its Neko on `PATH` and sets the variables `haxelib`
    /// reads to find its repository and the standard library.
    pub fn configure_environment(&self, env: &mut HashMap<String, String>) -> Result<()> {
        let neko = self.neko_vm().ok_or_else(|| HxError::NekoNotFound {
            sdk: self.name.clone(),
        })?;

        neko.configure_environment(env);
        prepend_to_path(env, &[&self.install_root]);
        env.insert(ENV_HAXEPATH.to_string(), path_string(&self.install_root));
        env.insert(ENV_HAXE_STD_PATH.to_string(), path_string(&self.std_lib_dir()));
        env.insert(ENV_HAXELIB_PATH.to_string(), path_string(&self.library_cache_dir()));
        Ok(())
    }
}

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).filter(|value| !value.is_empty()).map(PathBuf::from)
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl fmt::Debug for HaxeSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HaxeSdk")
            .field("name", &self.name)
            .field("install_root", &self.install_root)
            .field("neko", &self.neko)
            .finish_non_exhaustive()
    }
}

impl PartialEq for HaxeSdk {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.install_root == other.install_root
    }
}

impl Eq for HaxeSdk {}

impl fmt::Display for HaxeSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.install_root.display())
    }
}
