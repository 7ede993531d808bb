//! Haxe SDK and Neko VM handles, version probes, and auto-discovery.
//!
//! An SDK is valid when `<root>/haxe -version` prints a semantic version.
//! Probe results are cached per executable with a short lifetime for
//! negative answers and a long one for confirmed installations, so an SDK
//! installed while the process runs is noticed within seconds while a
//! working one is not re-spawned on every access.
//!
//! Discovery checks the `HAXEPATH` (or `NEKOPATH`) environment variable
//! first and then searches `PATH`. Its outcome is cached process-wide with
//! its own pair of lifetimes.

pub mod neko;
pub mod probe;
pub mod sdk;

pub use neko::NekoVm;
pub use sdk::HaxeSdk;

use crate::constants::{DISCOVERY_TTL_HIT, DISCOVERY_TTL_MISS, ENV_HAXEPATH, ENV_NEKOPATH};
use crate::utils::platform::find_install_root_on_path;
use crate::utils::ttl_cache::TtlCache;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// Name given to an SDK found by discovery rather than taken from the registry.
pub const DISCOVERED_SDK_NAME: &str = "auto";

static DISCOVERED_SDK: LazyLock<TtlCache<Option<HaxeSdk>>> =
    LazyLock::new(|| TtlCache::new(find_sdk, discovery_lifetime));

static DISCOVERED_NEKO: LazyLock<TtlCache<Option<NekoVm>>> =
    LazyLock::new(|| TtlCache::new(find_neko, discovery_lifetime));

fn discovery_lifetime<T>(found: &Option<T>) -> Duration {
    if found.is_some() { DISCOVERY_TTL_HIT } else { DISCOVERY_TTL_MISS }
}

/// The SDK found on this machine, if any. Cached.
#[must_use]
pub fn discover_sdk() -> Option<HaxeSdk> {
    DISCOVERED_SDK.get()
}

/// [`discover_sdk`] for async callers; a stale search runs on the blocking pool.
pub async fn discover_sdk_async() -> Option<HaxeSdk> {
    if DISCOVERED_SDK.is_fresh() {
        return DISCOVERED_SDK.get();
    }
    tokio::task::spawn_blocking(discover_sdk).await.unwrap_or_else(|e| {
        tracing::debug!(target: "toolchain", "Discovery task failed: {e}");
        None
    })
}

/// The Neko VM found on this machine, if any. Cached.
#[must_use]
pub fn discover_neko() -> Option<NekoVm> {
    DISCOVERED_NEKO.get()
}

/// Forget cached discovery results, e.g. after the user installed an SDK.
pub fn invalidate_discovery() {
    DISCOVERED_SDK.invalidate();
    DISCOVERED_NEKO.invalidate();
}

fn candidate_roots(env_var: &str, tool: &str) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(value) = std::env::var_os(env_var).filter(|v| !v.is_empty()) {
        roots.push(PathBuf::from(value));
    }
    if let Some(root) = find_install_root_on_path(tool)
        && !roots.contains(&root)
    {
        roots.push(root);
    }
    roots
}

fn find_sdk() -> Option<HaxeSdk> {
    let found = candidate_roots(ENV_HAXEPATH, "haxe")
        .into_iter()
        .map(|root| HaxeSdk::new(DISCOVERED_SDK_NAME, root))
        .find(HaxeSdk::is_valid);
    match &found {
        Some(sdk) => tracing::debug!(target: "toolchain", "Discovered Haxe SDK at {}", sdk.install_root().display()),
        None => tracing::debug!(target: "toolchain", "No Haxe SDK found via {ENV_HAXEPATH} or PATH"),
    }
    found
}

fn find_neko() -> Option<NekoVm> {
    let found = candidate_roots(ENV_NEKOPATH, "neko").into_iter().map(NekoVm::new).find(NekoVm::is_present);
    if found.is_none() {
        tracing::debug!(target: "toolchain", "No Neko VM found via {ENV_NEKOPATH} or PATH");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_lifetimes() {
        assert_eq!(discovery_lifetime(&Some(())), DISCOVERY_TTL_HIT);
        assert_eq!(discovery_lifetime::<()>(&None), DISCOVERY_TTL_MISS);
        assert!(DISCOVERY_TTL_MISS < DISCOVERY_TTL_HIT);
    }

    #[test]
    fn test_discovery_is_cached() {
        // Whatever this machine has, two lookups inside the lifetime agree.
        let first = discover_sdk();
        let second = discover_sdk();
        assert_eq!(first, second);
    }
}
