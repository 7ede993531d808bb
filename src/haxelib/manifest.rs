//! The `haxelib.json` manifest shipped inside every library.

use crate::constants::HAXELIB_MANIFEST;
use crate::core::HxError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Library metadata. Only `name` is required; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaxelibManifest {
    /// Library name
    pub name: String,

    /// Released version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// One-line summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// License identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Project homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Entry-point class for `haxelib run`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Subfolder holding the sources, relative to the library root
    #[serde(default, rename = "classPath", skip_serializing_if = "Option::is_none")]
    pub class_path: Option<String>,

    /// Library name to version constraint; an empty constraint means any version
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

impl HaxelibManifest {
    /// Parse the manifest in `library_dir`.
    ///
    /// A missing or malformed file is a [`HxError::ManifestParse`].
    pub fn load(library_dir: &Path) -> Result<Self> {
        let path = library_dir.join(HAXELIB_MANIFEST);
        let content = std::fs::read_to_string(&path).map_err(|e| HxError::ManifestParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| {
            HxError::ManifestParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        // Some published manifests start with a UTF-8 BOM.
        serde_json::from_str(content.trim_start_matches('\u{feff}'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = HaxelibManifest::parse(
            r#"{
                "name": "tink_core",
                "version": "2.1.0",
                "license": "MIT",
                "classPath": "src",
                "releasenote": "ignored",
                "contributors": ["back2dos"],
                "dependencies": { "tink_macro": "", "tink_priority": "1.0.0" }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "tink_core");
        assert_eq!(manifest.version.as_deref(), Some("2.1.0"));
        assert_eq!(manifest.class_path.as_deref(), Some("src"));
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies["tink_priority"], "1.0.0");
    }

    #[test]
    fn test_name_is_required() {
        assert!(HaxelibManifest::parse(r#"{ "version": "1.0.0" }"#).is_err());
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = HaxelibManifest::load(temp.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<HxError>(), Some(HxError::ManifestParse { .. })));
    }

    #[test]
    fn test_load_malformed_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(HAXELIB_MANIFEST), "{ not json").unwrap();
        let err = HaxelibManifest::load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid haxelib manifest"));
    }

    #[test]
    fn test_load_with_bom() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(HAXELIB_MANIFEST), "\u{feff}{\"name\":\"format\"}").unwrap();
        assert_eq!(HaxelibManifest::load(temp.path()).unwrap().name, "format");
    }
}
