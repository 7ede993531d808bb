//! Version probes shared by every handle to the same executable.
//!
//! A probe runs a tool once, extracts a version from its output, and caches
//! the answer in a [`TtlCache`]. Probes are registered process-wide by
//! executable path, so two `HaxeSdk` values pointing at the same install
//! (one from the registry, one from auto-discovery) share one cache and one
//! process spawn.

use crate::constants::{PROBE_TIMEOUT, PROBE_TTL_CONFIRMED, PROBE_TTL_UNCONFIRMED};
use crate::process::ToolCommand;
use crate::utils::is_executable;
use crate::utils::ttl_cache::TtlCache;
use dashmap::DashMap;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

/// Pulls a version out of a tool's combined output; `None` means "not this tool".
pub type VersionExtractor = fn(&str) -> Option<String>;

/// Cached result of a version probe.
pub type ProbeCache = TtlCache<Option<String>>;

static PROBES: LazyLock<DashMap<PathBuf, Arc<ProbeCache>>> = LazyLock::new(DashMap::new);

static HAXE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+\.\d+\.\d+\S*)").expect("static regex is valid"));

static NEKO_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NekoVM\s+(\d+(?:\.\d+)*)").expect("static regex is valid"));

/// Return the shared probe for `executable`, creating it on first use.
pub fn probe_for(
    executable: &Path,
    args: &'static [&'static str],
    extract: VersionExtractor,
) -> Arc<ProbeCache> {
    PROBES
        .entry(executable.to_path_buf())
        .or_insert_with(|| {
            let exe = executable.to_path_buf();
            Arc::new(TtlCache::new(move || run_probe(&exe, args, extract), probe_lifetime))
        })
        .value()
        .clone()
}

fn probe_lifetime(version: &Option<String>) -> std::time::Duration {
    if version.is_some() {
        PROBE_TTL_CONFIRMED
    } else {
        PROBE_TTL_UNCONFIRMED
    }
}

fn run_probe(executable: &Path, args: &[&str], extract: VersionExtractor) -> Option<String> {
    if !is_executable(executable) {
        tracing::debug!(target: "toolchain", "Not an executable: {}", executable.display());
        return None;
    }
    match ToolCommand::new(executable).args(args.iter().copied()).output_blocking(PROBE_TIMEOUT) {
        Ok(output) => {
            let version = extract(&output.combined());
            if version.is_none() {
                tracing::debug!(
                    target: "toolchain",
                    "No version in output of {}: {}",
                    executable.display(),
                    output.combined().trim()
                );
            }
            version
        }
        Err(e) => {
            tracing::debug!(target: "toolchain", "Probe failed: {e:#}");
            None
        }
    }
}

/// Version printed by `haxe -version`: the first non-empty line, which must be
/// a valid semantic version (`4.3.6`, `4.0.0-rc.5+1dc1b9a`).
#[must_use]
pub fn parse_haxe_version(output: &str) -> Option<String> {
    let line = output.lines().find(|line| !line.trim().is_empty())?;
    let version = HAXE_VERSION.captures(line)?.get(1)?.as_str();
    semver::Version::parse(version).ok()?;
    Some(version.to_string())
}

/// Version in the banner `neko` prints when run without arguments.
#[must_use]
pub fn parse_neko_version(output: &str) -> Option<String> {
    Some(NEKO_VERSION.captures(output)?.get(1)?.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_haxe_version() {
        assert_eq!(parse_haxe_version("4.3.6\n").as_deref(), Some("4.3.6"));
        assert_eq!(parse_haxe_version("\n  3.4.7").as_deref(), Some("3.4.7"));
        assert_eq!(
            parse_haxe_version("4.0.0-rc.5+1dc1b9a\n").as_deref(),
            Some("4.0.0-rc.5+1dc1b9a")
        );
    }

    #[test]
    fn test_parse_haxe_version_rejects_other_output() {
        assert_eq!(parse_haxe_version(""), None);
        assert_eq!(parse_haxe_version("command not found: haxe"), None);
        assert_eq!(parse_haxe_version("4.3"), None);
        assert_eq!(parse_haxe_version("4.3.x"), None);
    }

    #[test]
    fn test_parse_neko_version() {
        let banner = "NekoVM 2.3.0 (c)2005-2019 Haxe Foundation\n  Usage : neko <file>\n";
        assert_eq!(parse_neko_version(banner).as_deref(), Some("2.3.0"));
        assert_eq!(parse_neko_version("Usage: something else"), None);
    }

    #[test]
    fn test_probe_of_missing_executable_is_none() {
        let temp = tempfile::TempDir::new().unwrap();
        let probe = probe_for(&temp.path().join("haxe"), &["-version"], parse_haxe_version);
        assert_eq!(probe.get(), None);
    }

    #[test]
    fn test_probes_are_shared_per_executable() {
        let temp = tempfile::TempDir::new().unwrap();
        let exe = temp.path().join("haxe");
        let first = probe_for(&exe, &["-version"], parse_haxe_version);
        let second = probe_for(&exe, &["-version"], parse_haxe_version);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
