//! hxdeps - Haxe build files and haxelib dependency resolution
//!
//! The core an IDE or build tool needs to understand a Haxe project: which
//! directories hold its sources and which installed libraries it depends on,
//! transitively.
//!
//! # Architecture Overview
//!
//! A project declares its inputs in one of three build-file conventions:
//!
//! - plain `.hxml` argument files (`build.hxml`, `tests.hxml`, `test.hxml`)
//! - Lime/OpenFL `project.xml`
//! - lix, where `haxe_libraries/<name>.hxml` lockfiles pin every library
//!
//! [`build_file::BuildFile`] reads any of them (plus a virtual file
//! synthesized for lix projects without one) and lists source paths and
//! library references. References are turned into installed libraries by a
//! [`haxelib::LibraryLocator`]: the SDK's haxelib repository, installing
//! missing libraries with `haxelib install`, or the lix lockfiles. The
//! transitive closure is computed once over that seam by
//! [`haxelib::DependencyWalk`].
//!
//! # Core Modules
//!
//! ## Build inputs
//! - [`hxml`] - Argument-file tokenizer and the option flags it recognises
//! - [`build_file`] - Build-file variants, detection, and dependency resolution
//! - [`project`] - Per-project settings with change tracking
//!
//! ## Toolchain
//! - [`toolchain`] - Haxe SDK and Neko VM handles, probes, and discovery
//! - [`haxelib`] - Installed libraries, `haxelib.json`, the installer, and the closure walk
//! - [`process`] - Subprocess execution with line streaming and shutdown escalation
//!
//! ## Orchestration
//! - [`refresh`] - Per-project serialized background resolution
//! - [`watch`] - File-change relevance and dispatch
//! - [`config`] - Global SDK registry (`~/.hxdeps/config.toml`)
//! - [`progress`] - Progress reporting and cooperative cancellation
//!
//! ## Supporting Modules
//! - [`core`] - Error types and user-facing error rendering
//! - [`constants`] - File names, timeouts, and cache lifetimes
//! - [`utils`] - Filesystem, platform, TTL cache, and terminal progress helpers
//! - [`cli`] - The `hxdeps` command line
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Register an SDK and make it the default
//! hxdeps sdk add stable /opt/haxe-4.3.6
//!
//! # Source paths and libraries of the current project
//! hxdeps resolve
//! hxdeps resolve --json
//!
//! # Pin the build system of a project
//! hxdeps --project ~/games/platformer config set build_system lime
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use hxdeps::build_file::BuildFile;
//! use hxdeps::hxml::FlagSet;
//! use hxdeps::progress::LogProgress;
//! use hxdeps::toolchain::discover_sdk_async;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = Path::new("my-game");
//! if let Some(build_file) = BuildFile::detect(root, &FlagSet::default()) {
//!     let sdk = discover_sdk_async().await;
//!     for library in build_file.dependencies(sdk.as_ref(), &LogProgress::default()).await? {
//!         println!("{library} -> {}", library.source_dir().display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// Build inputs
pub mod build_file;
pub mod hxml;
pub mod project;

// Toolchain
pub mod haxelib;
pub mod process;
pub mod toolchain;

// Orchestration
pub mod progress;
pub mod refresh;
pub mod watch;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
