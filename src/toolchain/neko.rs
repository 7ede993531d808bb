//! The Neko VM, which `haxelib` runs on.

use super::probe::{ProbeCache, parse_neko_version, probe_for};
use crate::constants::ENV_NEKOPATH;
use crate::utils::executable_name;
use crate::utils::platform::prepend_to_path;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A Neko installation identified by the directory holding the `neko` executable.
#[derive(Clone)]
pub struct NekoVm {
    install_root: PathBuf,
    probe: Arc<ProbeCache>,
}

impl NekoVm {
    /// Handle for the Neko installed in `install_root`. Nothing is checked yet.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        let install_root = install_root.into();
        let probe = probe_for(&install_root.join(executable_name("neko")), &[], parse_neko_version);
        Self {
            install_root,
            probe,
        }
    }

    /// Directory containing the executable.
    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Path of the `neko` executable.
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.install_root.join(executable_name("neko"))
    }

    /// Whether a `neko` executable file is present, without running it.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.executable().is_file()
    }

    /// Version from the `NekoVM x.y.z` banner, cached.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.probe.get()
    }

    /// Whether the executable runs and identifies itself as Neko.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.version().is_some()
    }

    /// Put Neko on `PATH` and point `NEKOPATH` at it.
    pub fn configure_environment(&self, env: &mut HashMap<String, String>) {
        prepend_to_path(env, &[&self.install_root]);
        env.insert(ENV_NEKOPATH.to_string(), self.install_root.to_string_lossy().into_owned());
        // The VM loads libneko from its own directory.
        #[cfg(all(unix, not(target_os = "macos")))]
        prepend_library_path(env, "LD_LIBRARY_PATH", &self.install_root);
        #[cfg(target_os = "macos")]
        prepend_library_path(env, "DYLD_FALLBACK_LIBRARY_PATH", &self.install_root);
    }
}

#[cfg(unix)]
fn prepend_library_path(env: &mut HashMap<String, String>, var: &str, dir: &Path) {
    let dir = dir.to_string_lossy();
    let value = match env.get(var) {
        Some(existing) if !existing.is_empty() => format!("{dir}:{existing}"),
        _ => dir.into_owned(),
    };
    env.insert(var.to_string(), value);
}

impl fmt::Debug for NekoVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NekoVm").field("install_root", &self.install_root).finish_non_exhaustive()
    }
}

impl PartialEq for NekoVm {
    fn eq(&self, other: &Self) -> bool {
        self.install_root == other.install_root
    }
}

impl Eq for NekoVm {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_neko_is_invalid() {
        let temp = TempDir::new().unwrap();
        let neko = NekoVm::new(temp.path());
        assert!(!neko.is_present());
        assert!(!neko.is_valid());
    }

    #[test]
    fn test_configure_environment_sets_nekopath() {
        let neko = NekoVm::new("/opt/neko");
        let mut env = HashMap::new();
        neko.configure_environment(&mut env);
        assert_eq!(env[ENV_NEKOPATH], "/opt/neko");
        assert!(env[crate::utils::platform::PATH_VAR].starts_with("/opt/neko"));
    }

    #[cfg(unix)]
    #[test]
    fn test_banner_probe() {
        let temp = TempDir::new().unwrap();
        crate::test_utils::write_script(
            &temp.path().join("neko"),
            "echo 'NekoVM 2.3.0 (c)2005-2019 Haxe Foundation'\nexit 1\n",
        );
        let neko = NekoVm::new(temp.path());
        assert!(neko.is_present());
        assert_eq!(neko.version().as_deref(), Some("2.3.0"));
    }
}
