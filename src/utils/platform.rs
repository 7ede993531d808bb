//! Platform-specific helpers: executable names, PATH handling, home directory.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the `PATH`-like environment variable.
pub const PATH_VAR: &str = "PATH";

/// Returns `true` when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Platform executable file name for a tool (`haxe` → `haxe.exe` on Windows).
#[must_use]
pub fn executable_name(tool: &str) -> String {
    if is_windows() {
        format!("{tool}.exe")
    } else {
        tool.to_string()
    }
}

/// Get the user's home directory.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Whether `path` is a regular file the current user may execute.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Locate a tool on `PATH` and return the directory containing its real binary.
///
/// Symlinks (Homebrew, asdf shims, `/usr/local/bin`) are resolved so the
/// returned directory is the actual install root.
#[must_use]
pub fn find_install_root_on_path(tool: &str) -> Option<PathBuf> {
    let found = which::which(tool).ok()?;
    let real = std::fs::canonicalize(&found).unwrap_or(found);
    real.parent().map(Path::to_path_buf)
}

/// Prepend directories to the `PATH` entry of an environment map.
pub fn prepend_to_path(env: &mut HashMap<String, String>, dirs: &[&Path]) {
    let existing = env.get(PATH_VAR).cloned().unwrap_or_default();
    let mut entries: Vec<PathBuf> = dirs.iter().map(|d| d.to_path_buf()).collect();
    if !existing.is_empty() {
        entries.extend(std::env::split_paths(&existing));
    }
    match std::env::join_paths(entries) {
        Ok(joined) => {
            env.insert(PATH_VAR.to_string(), joined.to_string_lossy().into_owned());
        }
        Err(e) => {
            tracing::warn!("Could not extend PATH: {e}");
        }
    }
}

/// Snapshot of the current process environment as a mutable map.
#[must_use]
pub fn current_env() -> HashMap<String, String> {
    std::env::vars().collect()
}
