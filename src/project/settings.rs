//! Project-scoped settings file: `<project>/.hxdeps/settings.toml`.
//!
//! A flat table of string values. Unknown keys are preserved so that newer
//! versions can add settings without older ones dropping them on save.

use crate::utils::fs::safe_write;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Folder holding hxdeps state inside a project.
pub const SETTINGS_DIR: &str = ".hxdeps";

/// Settings file name inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.toml";

/// Settings file of the project at `project_root`.
#[must_use]
pub fn settings_path(project_root: &Path) -> PathBuf {
    project_root.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

/// Read the settings of a project. A missing file yields an empty map.
pub fn load_settings(project_root: &Path) -> Result<BTreeMap<String, String>> {
    let path = settings_path(project_root);
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the settings of a project, replacing the file atomically.
pub fn save_settings(project_root: &Path, settings: &BTreeMap<String, String>) -> Result<()> {
    let path = settings_path(project_root);
    let content = toml::to_string(settings).context("Failed to serialize project settings")?;
    safe_write(&path, &content).with_context(|| format!("Failed to save {}", path.display()))
}
