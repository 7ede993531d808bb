//! Cross-platform utilities used throughout hxdeps.
//!
//! - [`fs`] - atomic writes, marker-file reading, modification times
//! - [`platform`] - executable names, `PATH` manipulation, home directory
//! - [`progress`] - spinner-backed progress reporting for the CLI
//! - [`ttl_cache`] - time-to-live memoization for toolchain probes

pub mod fs;
pub mod platform;
pub mod progress;
pub mod ttl_cache;

pub use fs::{atomic_write, ensure_dir, read_first_line, safe_write};
pub use platform::{executable_name, get_home_dir, is_executable, is_windows};
pub use ttl_cache::TtlCache;
