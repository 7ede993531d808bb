//! Per-project build configuration.
//!
//! A project stores four settings: which build system it uses, an optional
//! pinned build file, an optional SDK override, and whether it rebuilds on
//! change. [`ProjectBuildConfig`] reads them from the project's settings
//! file, records every modification in a change log, and either persists
//! the changes ([`save`](ProjectBuildConfig::save), which also schedules a
//! dependency refresh) or rolls them back ([`revert`](ProjectBuildConfig::revert)).

pub mod settings;

use crate::build_file::{BuildFile, BuildSystem};
use crate::config::GlobalConfig;
use crate::core::HxError;
use crate::hxml::FlagSet;
use crate::refresh::DependencyRefresher;
use crate::toolchain::{HaxeSdk, discover_sdk_async};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// The settings a project stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// `"true"` to rebuild when files change
    AutoBuild,
    /// Name of a registered SDK overriding the default
    AltSdk,
    /// Build file pinned by the user, relative to the project root or absolute
    BuildFile,
    /// `hxml`, `lime`, or `lix`
    BuildSystem,
}

impl SettingKey {
    /// Every setting.
    pub const ALL: [Self; 4] = [Self::AutoBuild, Self::AltSdk, Self::BuildFile, Self::BuildSystem];

    /// Key in the settings file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoBuild => "auto_build",
            Self::AltSdk => "alt_sdk",
            Self::BuildFile => "build_file",
            Self::BuildSystem => "build_system",
        }
    }

    fn validate(self, value: &str) -> Result<()> {
        match self {
            Self::AutoBuild => {
                value.parse::<bool>().map_err(|_| HxError::ConfigError {
                    message: format!("auto_build must be true or false, got '{value}'"),
                })?;
            }
            Self::BuildSystem => {
                value.parse::<BuildSystem>()?;
            }
            Self::AltSdk | Self::BuildFile => {}
        }
        Ok(())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = HxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|key| key.as_str() == s.trim()).ok_or_else(|| HxError::ConfigError {
            message: format!(
                "Unknown setting '{s}' (expected one of: {})",
                Self::ALL.map(Self::as_str).join(", ")
            ),
        })
    }
}

/// One recorded modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    /// Setting that changed
    pub key: SettingKey,
    /// Value before the change
    pub old: Option<String>,
    /// Value after the change
    pub new: Option<String>,
}

/// A project's build configuration with unsaved changes tracked.
pub struct ProjectBuildConfig {
    project_root: PathBuf,
    values: BTreeMap<String, String>,
    changes: Vec<SettingChange>,
    refresher: Option<Arc<DependencyRefresher>>,
}

impl ProjectBuildConfig {
    /// Load the configuration of the project at `project_root`.
    pub fn load(project_root: impl Into<PathBuf>) -> Result<Self> {
        let project_root = project_root.into();
        let values = settings::load_settings(&project_root)?;
        Ok(Self {
            project_root,
            values,
            changes: Vec::new(),
            refresher: None,
        })
    }

    /// Schedule refreshes on `refresher` after each successful save.
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<DependencyRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Raw value of a setting.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }

    /// Change a setting, recording the change. Setting the current value is a no-op.
    pub fn set(&mut self, key: SettingKey, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        let old = self.values.get(key.as_str()).cloned();
        if old == value {
            return;
        }
        match &value {
            Some(v) => self.values.insert(key.as_str().to_string(), v.clone()),
            None => self.values.remove(key.as_str()),
        };
        self.changes.push(SettingChange {
            key,
            old,
            new: value,
        });
    }

    /// [`set`](Self::set) after checking the value is valid for the key.
    pub fn set_checked(&mut self, key: SettingKey, value: &str) -> Result<()> {
        key.validate(value.trim())?;
        self.set(key, Some(value.trim().to_string()));
        Ok(())
    }

    /// Configured build system, else the one detected from the layout.
    #[must_use]
    pub fn build_system(&self) -> BuildSystem {
        match self.get(SettingKey::BuildSystem).map(str::parse::<BuildSystem>) {
            Some(Ok(system)) => system,
            Some(Err(e)) => {
                tracing::warn!("{}: {e}", self.project_root.display());
                BuildSystem::detect(&self.project_root)
            }
            None => BuildSystem::detect(&self.project_root),
        }
    }

    /// Pin the build system, or `None` to detect it.
    pub fn set_build_system(&mut self, system: Option<BuildSystem>) {
        self.set(SettingKey::BuildSystem, system.map(|s| s.as_str().to_string()));
    }

    /// Pinned build file, resolved against the project root.
    #[must_use]
    pub fn manual_build_file(&self) -> Option<PathBuf> {
        self.get(SettingKey::BuildFile).map(|path| self.project_root.join(path))
    }

    /// Pin a build file, or `None` to use the default names.
    pub fn set_manual_build_file(&mut self, path: Option<&Path>) {
        self.set(SettingKey::BuildFile, path.map(|p| p.to_string_lossy().into_owned()));
    }

    /// Name of the SDK override.
    #[must_use]
    pub fn alt_sdk(&self) -> Option<&str> {
        self.get(SettingKey::AltSdk)
    }

    /// Override the SDK by registry name, or `None` to use the default.
    pub fn set_alt_sdk(&mut self, name: Option<&str>) {
        self.set(SettingKey::AltSdk, name.map(str::to_string));
    }

    /// Whether the project rebuilds when its files change.
    #[must_use]
    pub fn auto_build(&self) -> bool {
        self.get(SettingKey::AutoBuild).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Turn auto-build on or off.
    pub fn set_auto_build(&mut self, enabled: bool) {
        self.set(SettingKey::AutoBuild, Some(enabled.to_string()));
    }

    /// The build file governing the project.
    ///
    /// A pinned file wins if it exists and has the build system's extension;
    /// otherwise the first existing default file; otherwise, for lix projects
    /// only, the virtual build file.
    #[must_use]
    pub fn build_file(&self, flags: &FlagSet) -> Option<BuildFile> {
        let system = self.build_system();
        if let Some(manual) = self.manual_build_file() {
            if manual.is_file() && system.accepts(&manual) {
                return Some(BuildFile::open(system, &self.project_root, manual, flags));
            }
            tracing::debug!(
                target: "build_file",
                "Ignoring pinned build file {} (missing or not .{})",
                manual.display(),
                system.extension()
            );
        }
        BuildFile::find(system, &self.project_root, flags)
    }

    /// SDK for this project: the override, else the global default, else discovery.
    ///
    /// An override naming an unregistered SDK is reported and skipped.
    /// Discovery runs on the blocking pool.
    pub async fn effective_sdk(&self, global: &GlobalConfig) -> Option<HaxeSdk> {
        match self.configured_sdk(global) {
            Some(sdk) => Some(sdk),
            None => discover_sdk_async().await,
        }
    }

    fn configured_sdk(&self, global: &GlobalConfig) -> Option<HaxeSdk> {
        if let Some(name) = self.alt_sdk() {
            match global.sdk(name) {
                Some(sdk) => return Some(sdk),
                None => tracing::warn!(
                    "{}: {}",
                    self.project_root.display(),
                    HxError::SdkNotRegistered {
                        name: name.to_string(),
                    }
                ),
            }
        }
        global.default_sdk()
    }

    /// Unsaved changes, oldest first.
    #[must_use]
    pub fn pending_changes(&self) -> &[SettingChange] {
        &self.changes
    }

    /// Whether there is anything to save or revert.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Persist the settings, clear the change log, and schedule a refresh.
    pub fn save(&mut self) -> Result<()> {
        settings::save_settings(&self.project_root, &self.values)?;
        tracing::debug!(
            "Saved {} setting change(s) for {}",
            self.changes.len(),
            self.project_root.display()
        );
        self.changes.clear();
        if let Some(refresher) = &self.refresher {
            refresher.schedule(&self.project_root);
        }
        Ok(())
    }

    /// Undo every unsaved change, newest first, and clear the change log.
    pub fn revert(&mut self) {
        for change in self.changes.drain(..).rev() {
            match change.old {
                Some(old) => self.values.insert(change.key.as_str().to_string(), old),
                None => self.values.remove(change.key.as_str()),
            };
        }
    }
}

impl fmt::Debug for ProjectBuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectBuildConfig")
            .field("project_root", &self.project_root)
            .field("values", &self.values)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LIX_LIBRARIES_DIR;
    use tempfile::TempDir;

    #[test]
    fn test_setting_key_parse() {
        assert_eq!("alt_sdk".parse::<SettingKey>().unwrap(), SettingKey::AltSdk);
        let err = "colour".parse::<SettingKey>().unwrap_err();
        assert!(err.to_string().contains("auto_build, alt_sdk, build_file, build_system"));
    }

    #[test]
    fn test_set_records_changes_and_revert_restores() {
        let temp = TempDir::new().unwrap();
        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        config.set_build_system(Some(BuildSystem::Lime));
        config.save().unwrap();

        config.set_build_system(Some(BuildSystem::Hxml));
        config.set_alt_sdk(Some("nightly"));
        config.set_build_system(Some(BuildSystem::Lix));
        assert_eq!(config.pending_changes().len(), 3);

        config.revert();
        assert!(!config.is_dirty());
        assert_eq!(config.get(SettingKey::BuildSystem), Some("lime"));
        assert_eq!(config.alt_sdk(), None);
    }

    #[test]
    fn test_setting_same_value_is_not_a_change() {
        let temp = TempDir::new().unwrap();
        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        config.set_auto_build(true);
        config.set_auto_build(true);
        assert_eq!(config.pending_changes().len(), 1);
    }

    #[test]
    fn test_save_persists_and_clears_log() {
        let temp = TempDir::new().unwrap();
        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        config.set_auto_build(true);
        config.set_alt_sdk(Some("4.3"));
        config.save().unwrap();
        assert!(!config.is_dirty());

        let reloaded = ProjectBuildConfig::load(temp.path()).unwrap();
        assert!(reloaded.auto_build());
        assert_eq!(reloaded.alt_sdk(), Some("4.3"));
    }

    #[test]
    fn test_set_checked_validates() {
        let temp = TempDir::new().unwrap();
        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        assert!(config.set_checked(SettingKey::AutoBuild, "maybe").is_err());
        assert!(config.set_checked(SettingKey::BuildSystem, "cmake").is_err());
        config.set_checked(SettingKey::BuildSystem, "lix").unwrap();
        assert_eq!(config.build_system(), BuildSystem::Lix);
        assert_eq!(config.pending_changes().len(), 1);
    }

    #[test]
    fn test_pinned_build_file_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.hxml"), "-cp src").unwrap();
        std::fs::write(temp.path().join("release.hxml"), "-cp release").unwrap();

        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        assert_eq!(config.build_file(&FlagSet::default()).unwrap().location(), temp.path().join("build.hxml"));

        config.set_manual_build_file(Some(Path::new("release.hxml")));
        assert_eq!(config.build_file(&FlagSet::default()).unwrap().location(), temp.path().join("release.hxml"));
    }

    #[test]
    fn test_pinned_build_file_with_wrong_extension_is_ignored() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.hxml"), "-cp src").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();

        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        config.set_manual_build_file(Some(Path::new("notes.txt")));
        assert_eq!(config.build_file(&FlagSet::default()).unwrap().location(), temp.path().join("build.hxml"));

        config.set_manual_build_file(Some(Path::new("missing.hxml")));
        assert_eq!(config.build_file(&FlagSet::default()).unwrap().location(), temp.path().join("build.hxml"));
    }

    #[test]
    fn test_no_build_file_unless_lix() {
        let temp = TempDir::new().unwrap();
        let config = ProjectBuildConfig::load(temp.path()).unwrap();
        assert!(config.build_file(&FlagSet::default()).is_none());

        std::fs::create_dir(temp.path().join(LIX_LIBRARIES_DIR)).unwrap();
        assert!(config.build_file(&FlagSet::default()).unwrap().is_virtual());
    }

    #[tokio::test]
    async fn test_effective_sdk_prefers_override() {
        let temp = TempDir::new().unwrap();
        let mut global = GlobalConfig::default();
        global.add_sdk("stable", "/opt/haxe-stable");
        global.add_sdk("nightly", "/opt/haxe-nightly");
        global.set_default_sdk("stable").unwrap();

        let mut config = ProjectBuildConfig::load(temp.path()).unwrap();
        assert_eq!(config.effective_sdk(&global).await.unwrap().name(), "stable");

        config.set_alt_sdk(Some("nightly"));
        assert_eq!(config.effective_sdk(&global).await.unwrap().name(), "nightly");

        config.set_alt_sdk(Some("unregistered"));
        assert_eq!(config.effective_sdk(&global).await.unwrap().name(), "stable");
    }
}
