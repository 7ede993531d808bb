//! Lix projects without an argument file.
//!
//! The arguments are synthesized from the project layout: `-cp src` when a
//! `src` folder exists (else `-cp .`), plus `-lib <name>` for every lockfile
//! in `haxe_libraries`. Layouts are remembered process-wide per project root
//! and re-read only when the modification time of the root or of
//! `haxe_libraries` changes, so repeated resolutions of one project share
//! the scan.

use super::hxml::{class_paths_of, library_specs_of};
use super::lix::LixLocator;
use crate::constants::{DEFAULT_SOURCE_DIR, LIX_LIBRARIES_DIR};
use crate::hxml::FlagSet;
use crate::utils::fs::modified_time;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

/// File name reported as the location; it is never read or written.
pub const VIRTUAL_FILE_NAME: &str = ".virtual.hxml";

type Stamp = (Option<SystemTime>, Option<SystemTime>);

/// What the synthesized arguments are built from.
#[derive(Debug, Clone)]
struct Layout {
    stamp: Stamp,
    source: &'static str,
    lockfiles: Vec<String>,
}

static LAYOUTS: LazyLock<DashMap<PathBuf, Layout>> = LazyLock::new(DashMap::new);

/// A synthesized argument file.
#[derive(Debug)]
pub struct VirtualFile {
    project_root: PathBuf,
    flags: FlagSet,
}

impl VirtualFile {
    /// Virtual file for the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, flags: FlagSet) -> Self {
        Self {
            project_root: project_root.into(),
            flags,
        }
    }

    /// Project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Synthetic path inside the project; does not exist on disk.
    #[must_use]
    pub fn location(&self) -> PathBuf {
        self.project_root.join(VIRTUAL_FILE_NAME)
    }

    fn stamp(&self) -> Stamp {
        (modified_time(&self.project_root), modified_time(&self.project_root.join(LIX_LIBRARIES_DIR)))
    }

    fn layout(&self) -> Layout {
        let stamp = self.stamp();
        if let Some(layout) = LAYOUTS.get(&self.project_root)
            && layout.stamp == stamp
        {
            return layout.clone();
        }

        let layout = Layout {
            stamp,
            source: if self.project_root.join(DEFAULT_SOURCE_DIR).is_dir() { DEFAULT_SOURCE_DIR } else { "." },
            lockfiles: lockfile_names(&self.project_root.join(LIX_LIBRARIES_DIR)),
        };
        tracing::debug!(
            target: "build_file",
            "Scanned {}: -cp {} with {} lockfile(s)",
            self.project_root.display(),
            layout.source,
            layout.lockfiles.len()
        );
        LAYOUTS.insert(self.project_root.clone(), layout.clone());
        layout
    }

    /// Current synthesized tokens, rebuilt if the layout changed.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.synthesize(self.layout())
    }

    fn synthesize(&self, layout: Layout) -> Vec<String> {
        let class_path_flag = self.flags.class_path.first().map_or("-cp", String::as_str);
        let library_flag = self.flags.library.first().map_or("-lib", String::as_str);

        let mut tokens = vec![class_path_flag.to_string(), layout.source.to_string()];
        for name in layout.lockfiles {
            tokens.push(library_flag.to_string());
            tokens.push(name);
        }
        tokens
    }

    /// Always exactly one entry.
    #[must_use]
    pub fn source_paths(&self) -> Vec<PathBuf> {
        class_paths_of(&self.flags, &self.tokens())
    }

    /// One name per lockfile, sorted.
    #[must_use]
    pub fn library_names(&self) -> Vec<String> {
        library_specs_of(&self.flags, &self.tokens()).into_iter().map(|spec| spec.name).collect()
    }

    /// Locator reading this project's lockfiles.
    #[must_use]
    pub fn locator(&self) -> LixLocator {
        LixLocator::new(&self.project_root, self.flags.clone())
    }
}

fn lockfile_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "hxml"))
        .filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(temp: &TempDir, libraries: &[&str]) -> PathBuf {
        let root = temp.path().to_path_buf();
        std::fs::create_dir_all(root.join(LIX_LIBRARIES_DIR)).unwrap();
        for name in libraries {
            std::fs::write(root.join(LIX_LIBRARIES_DIR).join(format!("{name}.hxml")), "").unwrap();
        }
        root
    }

    #[test]
    fn test_uses_src_when_present() {
        let temp = TempDir::new().unwrap();
        let root = project(&temp, &["tink_core", "format"]);
        std::fs::create_dir(root.join("src")).unwrap();

        let file = VirtualFile::new(&root, FlagSet::default());
        assert_eq!(file.tokens(), ["-cp", "src", "-lib", "format", "-lib", "tink_core"]);
        assert_eq!(file.source_paths(), [PathBuf::from("src")]);
        assert_eq!(file.library_names(), ["format", "tink_core"]);
    }

    #[test]
    fn test_falls_back_to_project_root() {
        let temp = TempDir::new().unwrap();
        let root = project(&temp, &[]);
        let file = VirtualFile::new(&root, FlagSet::default());
        assert_eq!(file.source_paths(), [PathBuf::from(".")]);
        assert!(file.library_names().is_empty());
    }

    #[test]
    fn test_ignores_non_lockfiles() {
        let temp = TempDir::new().unwrap();
        let root = project(&temp, &["heaps"]);
        std::fs::write(root.join(LIX_LIBRARIES_DIR).join("README.md"), "").unwrap();
        std::fs::create_dir(root.join(LIX_LIBRARIES_DIR).join("nested.hxml")).unwrap();
        assert_eq!(VirtualFile::new(&root, FlagSet::default()).library_names(), ["heaps"]);
    }

    #[test]
    fn test_location_is_virtual() {
        let temp = TempDir::new().unwrap();
        let file = VirtualFile::new(temp.path(), FlagSet::default());
        assert!(!file.location().exists());
        assert_eq!(file.location().parent(), Some(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_rebuilds_when_layout_changes() {
        let temp = TempDir::new().unwrap();
        let root = project(&temp, &["a"]);
        let file = VirtualFile::new(&root, FlagSet::default());
        assert_eq!(file.library_names(), ["a"]);

        let libraries = root.join(LIX_LIBRARIES_DIR);
        std::fs::write(libraries.join("b.hxml"), "").unwrap();
        // Make the change visible even on filesystems with coarse timestamps.
        let later = SystemTime::now() + std::time::Duration::from_secs(5);
        std::fs::File::open(&libraries).unwrap().set_modified(later).unwrap();

        assert_eq!(file.library_names(), ["a", "b"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_layout_is_shared_between_instances() {
        let temp = TempDir::new().unwrap();
        let root = project(&temp, &["a"]);
        let libraries = root.join(LIX_LIBRARIES_DIR);
        let pinned = SystemTime::now() - std::time::Duration::from_secs(60);
        std::fs::File::open(&libraries).unwrap().set_modified(pinned).unwrap();
        assert_eq!(VirtualFile::new(&root, FlagSet::default()).library_names(), ["a"]);

        // Same stamps: a fresh handle reuses the earlier scan.
        std::fs::write(libraries.join("b.hxml"), "").unwrap();
        std::fs::File::open(&libraries).unwrap().set_modified(pinned).unwrap();
        assert_eq!(VirtualFile::new(&root, FlagSet::default()).library_names(), ["a"]);

        let later = SystemTime::now() + std::time::Duration::from_secs(5);
        std::fs::File::open(&libraries).unwrap().set_modified(later).unwrap();
        assert_eq!(VirtualFile::new(&root, FlagSet::default()).library_names(), ["a", "b"]);
    }
}
