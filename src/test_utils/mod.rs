//! Test utilities for hxdeps
//!
//! Helpers shared by unit tests and the integration tests under `tests/`:
//!
//! - [`LibraryFixture`] lays out an installed library (`haxelib.json` plus the
//!   `.current` marker and version directory the haxelib repository uses)
//! - [`FakeSdk`] (Unix only) creates shell-script stand-ins for `haxe`,
//!   `haxelib`, and `neko` that record how they were invoked
//! - [`RecordingProgress`] is a progress sink that remembers task names and
//!   reported failures
//!
//! # Example
//!
//! ```rust,no_run
//! use hxdeps::test_utils::LibraryFixture;
//! use std::path::Path;
//!
//! let cache = Path::new("/tmp/haxelib");
//! LibraryFixture::new("format").version("3.5.0").install_current(cache);
//! ```

#[cfg(unix)]
pub mod fake_sdk;
pub mod fixtures;
pub mod progress;

#[cfg(unix)]
pub use fake_sdk::FakeSdk;
pub use fixtures::LibraryFixture;
pub use progress::RecordingProgress;

use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; without either, logging
/// stays off. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=hxdeps=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write an executable `/bin/sh` script, creating parent directories.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create script directory");
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}")).expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Write a text file, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, content).expect("write file");
}
