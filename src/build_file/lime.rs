//! Lime/OpenFL `project.xml` descriptors.
//!
//! Only two element kinds matter here, wherever they appear in the document:
//!
//! ```xml
//! <source path="src" />
//! <haxelib name="openfl" version="9.2.0" />
//! ```
//!
//! `<classpath path="..."/>` is accepted as a synonym of `<source>`.

use crate::core::HxError;
use crate::hxml::LibrarySpec;
use crate::hxml::flags::non_empty;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// A Lime project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimeFile {
    project_root: PathBuf,
    location: PathBuf,
}

/// What a parse of the document yields.
struct LimeDocument {
    sources: Vec<PathBuf>,
    libraries: Vec<LibrarySpec>,
}

impl LimeFile {
    /// Project file at `location` belonging to the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, location: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            location: location.into(),
        }
    }

    /// Project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Path of the XML file.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// `path` attributes of `<source>` elements, in document order.
    pub fn source_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self.parse()?.sources)
    }

    /// `<haxelib>` references, in document order.
    pub fn library_specs(&self) -> Result<Vec<LibrarySpec>> {
        Ok(self.parse()?.libraries)
    }

    fn parse(&self) -> Result<LimeDocument> {
        let parse_error = |reason: String| HxError::BuildFileParse {
            file: self.location.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(&self.location).map_err(|e| parse_error(e.to_string()))?;
        let document = roxmltree::Document::parse(&content).map_err(|e| parse_error(e.to_string()))?;

        let mut sources = Vec::new();
        let mut libraries = Vec::new();
        for node in document.descendants().filter(roxmltree::Node::is_element) {
            match node.tag_name().name() {
                "source" | "classpath" => {
                    if let Some(path) = node.attribute("path").map(str::trim).filter(|p| !p.is_empty()) {
                        sources.push(PathBuf::from(path));
                    }
                }
                "haxelib" => match node.attribute("name").map(str::trim).filter(|n| !n.is_empty()) {
                    Some(name) => libraries.push(LibrarySpec {
                        name: name.to_string(),
                        version: node.attribute("version").and_then(non_empty),
                    }),
                    None => tracing::debug!(
                        target: "build_file",
                        "Ignoring <haxelib> without name in {}",
                        self.location.display()
                    ),
                },
                _ => {}
            }
        }

        Ok(LimeDocument {
            sources,
            libraries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(temp: &TempDir, content: &str) -> LimeFile {
        let location = temp.path().join("project.xml");
        std::fs::write(&location, content).unwrap();
        LimeFile::new(temp.path(), location)
    }

    #[test]
    fn test_source_paths_in_document_order() {
        let temp = TempDir::new().unwrap();
        let file = write_project(
            &temp,
            r#"<?xml version="1.0" encoding="utf-8"?>
<project>
    <meta title="Demo" package="com.example.demo" version="1.0.0" />
    <source path="src"/>
    <section if="html5">
        <source path="dir/another src"/>
    </section>
    <source path="dir/yet another src"/>
</project>"#,
        );
        assert_eq!(
            file.source_paths().unwrap(),
            [PathBuf::from("src"), PathBuf::from("dir/another src"), PathBuf::from("dir/yet another src")]
        );
    }

    #[test]
    fn test_haxelib_elements() {
        let temp = TempDir::new().unwrap();
        let file = write_project(
            &temp,
            r#"<project>
    <haxelib name="openfl" />
    <haxelib name="actuate" version="1.8.9" />
    <haxelib version="1.0.0" />
    <classpath path="lib" />
</project>"#,
        );
        let specs = file.library_specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "openfl");
        assert_eq!(specs[0].version, None);
        assert_eq!(specs[1].version.as_deref(), Some("1.8.9"));
        assert_eq!(file.source_paths().unwrap(), [PathBuf::from("lib")]);
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = LimeFile::new(temp.path(), temp.path().join("project.xml"));
        let err = file.source_paths().unwrap_err();
        assert!(matches!(err.downcast_ref::<HxError>(), Some(HxError::BuildFileParse { .. })));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = write_project(&temp, "<project><source path=\"src\"></project>");
        assert!(file.library_specs().is_err());
    }
}
