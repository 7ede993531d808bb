//! Global configuration: the SDK registry and user-wide defaults.
//!
//! The file lives at `~/.hxdeps/config.toml` (`%LOCALAPPDATA%\hxdeps\config.toml`
//! on Windows) and can be relocated with `HXDEPS_CONFIG_PATH`.
//!
//! # File Format
//!
//! ```toml
//! # JSON list of registered SDKs, kept as a single string
//! sdks = '[{"name":"4.3","path":"/opt/haxe-4.3"},{"name":"nightly","path":"/opt/haxe-dev"}]'
//! default_sdk = "4.3"
//!
//! # Extra option synonyms, if a compiler adds any
//! [flags]
//! library = ["-lib", "-L", "--library"]
//! class_path = ["-cp", "-p", "--class-path"]
//! ```
//!
//! The registry is stored as a JSON string rather than a TOML array so the
//! file stays compatible with tools that persist it as one opaque preference
//! value.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hxdeps::config::GlobalConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = GlobalConfig::load().await?;
//! config.add_sdk("4.3", "/opt/haxe-4.3");
//! config.set_default_sdk("4.3")?;
//! config.save().await?;
//! # Ok(())
//! # }
//! ```

use crate::core::HxError;
use crate::hxml::FlagSet;
use crate::toolchain::{HaxeSdk, NekoVm};
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_VAR: &str = "HXDEPS_CONFIG_PATH";

/// One registered SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkEntry {
    /// Name used to select the SDK
    pub name: String,
    /// Install root
    pub path: PathBuf,
    /// Neko install root, when it is not next to the SDK or on `PATH`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neko: Option<PathBuf>,
}

impl SdkEntry {
    /// Handle for the registered SDK.
    #[must_use]
    pub fn to_sdk(&self) -> HaxeSdk {
        let sdk = HaxeSdk::new(&self.name, &self.path);
        match &self.neko {
            Some(neko) => sdk.with_neko(NekoVm::new(neko)),
            None => sdk,
        }
    }
}

mod json_list {
    use super::SdkEntry;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(entries: &[SdkEntry], serializer: S) -> Result<S::Ok, S::Error> {
        let json = serde_json::to_string(entries).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&json)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SdkEntry>, D::Error> {
        let json = String::deserialize(deserializer)?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&json).map_err(de::Error::custom)
    }
}

/// User-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Registered SDKs, in registration order.
    #[serde(default, with = "json_list", skip_serializing_if = "Vec::is_empty")]
    pub sdks: Vec<SdkEntry>,

    /// Name of the SDK used by projects without an override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sdk: Option<String>,

    /// Option flags recognised in argument files.
    #[serde(default, skip_serializing_if = "FlagSet::is_default")]
    pub flags: FlagSet,
}

impl GlobalConfig {
    /// Load from the default location; a missing file yields the defaults.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, or the default location when `None`.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load_from(&path).await,
            Some(_) => Ok(Self::default()),
            None => Self::load().await,
        }
    }

    /// Load from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Save to the default location.
    pub async fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path).await
    }

    /// Save to a specific file, replacing it atomically.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || atomic_write(&target, content.as_bytes()))
            .await
            .context("Config writer task failed")?
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// `HXDEPS_CONFIG_PATH`, else the platform default.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("hxdeps")
        } else {
            crate::utils::get_home_dir()?.join(".hxdeps")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Register an SDK, replacing any entry with the same name.
    pub fn add_sdk(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.add_sdk_entry(SdkEntry {
            name: name.into(),
            path: path.into(),
            neko: None,
        });
    }

    /// Register a full entry, replacing any entry with the same name.
    pub fn add_sdk_entry(&mut self, entry: SdkEntry) {
        match self.sdks.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.sdks.push(entry),
        }
    }

    /// Unregister an SDK. Clears the default if it pointed there.
    pub fn remove_sdk(&mut self, name: &str) -> bool {
        let before = self.sdks.len();
        self.sdks.retain(|entry| entry.name != name);
        if self.default_sdk.as_deref() == Some(name) {
            self.default_sdk = None;
        }
        self.sdks.len() != before
    }

    /// Registered entry by name.
    #[must_use]
    pub fn get_sdk(&self, name: &str) -> Option<&SdkEntry> {
        self.sdks.iter().find(|entry| entry.name == name)
    }

    /// Make a registered SDK the default.
    pub fn set_default_sdk(&mut self, name: &str) -> Result<()> {
        if self.get_sdk(name).is_none() {
            return Err(HxError::SdkNotRegistered {
                name: name.to_string(),
            }
            .into());
        }
        self.default_sdk = Some(name.to_string());
        Ok(())
    }

    /// Handle for a registered SDK.
    #[must_use]
    pub fn sdk(&self, name: &str) -> Option<HaxeSdk> {
        self.get_sdk(name).map(SdkEntry::to_sdk)
    }

    /// Handle for the default SDK, if one is set and registered.
    #[must_use]
    pub fn default_sdk(&self) -> Option<HaxeSdk> {
        self.default_sdk.as_deref().and_then(|name| self.sdk(name))
    }
}
