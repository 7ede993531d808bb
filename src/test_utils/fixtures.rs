//! Builders for installed-library layouts.

use crate::constants::{CURRENT_MARKER, HAXELIB_MANIFEST};
use crate::haxelib::versioned_dir_name;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An installed library to write to disk.
#[derive(Clone, Debug)]
pub struct LibraryFixture {
    name: String,
    version: String,
    class_path: Option<String>,
    dependencies: BTreeMap<String, String>,
}

impl LibraryFixture {
    /// Library `name` at version `1.0.0` with no dependencies.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            class_path: None,
            dependencies: BTreeMap::new(),
        }
    }

    /// Library name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the version.
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Set `classPath`.
    pub fn class_path(mut self, class_path: &str) -> Self {
        self.class_path = Some(class_path.to_string());
        self
    }

    /// Declare a dependency; an empty constraint means any version.
    pub fn dependency(mut self, name: &str, version: &str) -> Self {
        self.dependencies.insert(name.to_string(), version.to_string());
        self
    }

    /// The `haxelib.json` content.
    pub fn manifest_json(&self) -> String {
        let mut manifest = json!({
            "name": self.name,
            "version": self.version,
            "license": "MIT",
            "dependencies": self.dependencies,
        });
        if let Some(class_path) = &self.class_path {
            manifest["classPath"] = json!(class_path);
        }
        serde_json::to_string_pretty(&manifest).expect("serialize manifest")
    }

    /// Write the manifest into `dir` and return `dir`.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).expect("create library directory");
        std::fs::write(dir.join(HAXELIB_MANIFEST), self.manifest_json()).expect("write manifest");
        dir.to_path_buf()
    }

    /// Install into a haxelib repository as a non-current version.
    pub fn install_version(&self, cache: &Path) -> PathBuf {
        self.write_to(&cache.join(&self.name).join(versioned_dir_name(&self.version)))
    }

    /// Install into a haxelib repository and mark it current.
    pub fn install_current(&self, cache: &Path) -> PathBuf {
        let dir = self.install_version(cache);
        std::fs::write(cache.join(&self.name).join(CURRENT_MARKER), &self.version).expect("write .current");
        dir
    }
}
