//! Global constants used throughout the hxdeps codebase.
//!
//! This module contains file names, timeout durations, and cache lifetimes
//! that are shared by the toolchain probes, the library resolver, and the
//! build-file variants. Defining them centrally keeps magic numbers and
//! magic file names discoverable.

use std::time::Duration;

/// Manifest file inside every installed haxelib.
pub const HAXELIB_MANIFEST: &str = "haxelib.json";

/// Marker file redirecting a library to a local checkout (`haxelib dev`).
pub const DEV_MARKER: &str = ".dev";

/// Marker file naming the currently selected version of a library.
pub const CURRENT_MARKER: &str = ".current";

/// Project folder holding one lockfile (`<name>.hxml`) per library (lix convention).
pub const LIX_LIBRARIES_DIR: &str = "haxe_libraries";

/// Placeholder used inside lix lockfiles for the shared library cache.
pub const LIX_LIBCACHE_VAR: &str = "HAXE_LIBCACHE";

/// Placeholder used inside lix lockfiles for the project ("scope") directory.
pub const LIX_SCOPE_VAR: &str = "SCOPE_DIR";

/// Conventional source folder picked up by the virtual build file.
pub const DEFAULT_SOURCE_DIR: &str = "src";

/// Environment variable overriding the SDK install root during discovery.
pub const ENV_HAXEPATH: &str = "HAXEPATH";

/// Environment variable overriding the SDK standard-library directory.
pub const ENV_HAXE_STD_PATH: &str = "HAXE_STD_PATH";

/// Environment variable overriding the haxelib repository directory.
pub const ENV_HAXELIB_PATH: &str = "HAXELIB_PATH";

/// Environment variable overriding the Neko install root during discovery.
pub const ENV_NEKOPATH: &str = "NEKOPATH";

/// Lifetime of a probe result that is unknown or invalid (10 seconds).
///
/// Short so that an SDK installed while the process is running is picked up
/// without a restart.
pub const PROBE_TTL_UNCONFIRMED: Duration = Duration::from_secs(10);

/// Lifetime of a probe result that confirmed a valid installation (10 minutes).
pub const PROBE_TTL_CONFIRMED: Duration = Duration::from_secs(600);

/// Lifetime of a failed auto-discovery (15 seconds).
pub const DISCOVERY_TTL_MISS: Duration = Duration::from_secs(15);

/// Lifetime of a successful auto-discovery (10 minutes).
pub const DISCOVERY_TTL_HIT: Duration = Duration::from_secs(600);

/// Upper bound for a single version probe (`haxe -version`, `neko`).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on waiting for `haxelib install` to finish (5 minutes).
pub const INSTALLER_TIMEOUT: Duration = Duration::from_secs(300);

/// Grace period granted to the installer after a termination request.
pub const INSTALLER_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Interval at which the installer wait loop polls for cancellation.
pub const INSTALLER_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Number of trailing installer output lines kept for error reporting.
pub const INSTALLER_OUTPUT_LINES: usize = 20;
