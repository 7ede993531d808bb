//! Configuration management for hxdeps
//!
//! Two layers of persisted state exist:
//!
//! 1. **Global configuration** (`~/.hxdeps/config.toml`) - the registry of Haxe
//!    SDKs, the default SDK, and the option flags recognised in argument files.
//!    See [`GlobalConfig`].
//! 2. **Project settings** (`<project>/.hxdeps/settings.toml`) - the build
//!    system, a pinned build file, an SDK override, and the auto-build flag.
//!    See [`crate::project`].
//!
//! A project setting wins over the global default; auto-discovery is the
//! last resort when neither names an SDK.

pub mod global;

pub use global::{CONFIG_PATH_VAR, GlobalConfig, SdkEntry};
