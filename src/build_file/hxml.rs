//! Plain `.hxml` argument files.

use crate::hxml::{FlagSet, LibrarySpec, tokenize_file};
use std::path::{Path, PathBuf};

/// An argument file on disk. A missing file behaves as an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HxmlFile {
    project_root: PathBuf,
    location: PathBuf,
    flags: FlagSet,
}

impl HxmlFile {
    /// Argument file at `location` belonging to the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, location: impl Into<PathBuf>, flags: FlagSet) -> Self {
        Self {
            project_root: project_root.into(),
            location: location.into(),
            flags,
        }
    }

    /// Project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Path of the argument file.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Recognised option flags.
    #[must_use]
    pub const fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Tokens of the file as it is on disk now.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        tokenize_file(&self.location)
    }

    /// Values of class-path flags, in order.
    #[must_use]
    pub fn source_paths(&self) -> Vec<PathBuf> {
        class_paths_of(&self.flags, &self.tokens())
    }

    /// `-lib name[:version]` references, in order.
    #[must_use]
    pub fn library_specs(&self) -> Vec<LibrarySpec> {
        library_specs_of(&self.flags, &self.tokens())
    }
}

pub(super) fn class_paths_of(flags: &FlagSet, tokens: &[String]) -> Vec<PathBuf> {
    flags.class_paths(tokens).into_iter().map(PathBuf::from).collect()
}

pub(super) fn library_specs_of(flags: &FlagSet, tokens: &[String]) -> Vec<LibrarySpec> {
    flags.libraries(tokens).into_iter().map(LibrarySpec::parse).filter(|spec| !spec.name.is_empty()).collect()
}
