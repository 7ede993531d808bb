//! Build files: where a project declares its source paths and libraries.
//!
//! Four kinds are supported, all behind [`BuildFile`]:
//!
//! | Variant | File | Libraries resolved through |
//! |---|---|---|
//! | [`BuildFile::Hxml`] | `build.hxml`, `tests.hxml`, `test.hxml` | SDK library cache, installing on demand |
//! | [`BuildFile::Lime`] | `project.xml`, `Project.xml` | SDK library cache, installing on demand |
//! | [`BuildFile::Lix`] | an `.hxml` next to `haxe_libraries/` | lockfiles in `haxe_libraries/` |
//! | [`BuildFile::Virtual`] | none, synthesized | lockfiles in `haxe_libraries/` |
//!
//! Each variant only knows how to list source paths and library references.
//! Turning references into installed libraries and computing the transitive
//! closure is shared code driven by a [`LibraryLocator`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use hxdeps::build_file::BuildFile;
//! use hxdeps::hxml::FlagSet;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! if let Some(build_file) = BuildFile::detect(Path::new("."), &FlagSet::default()) {
//!     for path in build_file.source_paths()? {
//!         println!("{}", path.display());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod hxml;
pub mod lime;
pub mod lix;
pub mod virtual_file;

pub use hxml::HxmlFile;
pub use lime::LimeFile;
pub use lix::{LixFile, LixLocator};
pub use virtual_file::VirtualFile;

use crate::constants::{HAXELIB_MANIFEST, LIX_LIBRARIES_DIR};
use crate::core::HxError;
use crate::haxelib::closure::is_cancellation;
use crate::haxelib::{DependencyWalk, Haxelib, HaxelibManifest, LibraryLocator, SdkLocator};
use crate::hxml::{FlagSet, LibrarySpec};
use crate::progress::ProgressSink;
use crate::toolchain::HaxeSdk;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The convention a project's build file follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    /// Plain `.hxml` argument files
    Hxml,
    /// Lime/OpenFL `project.xml`
    Lime,
    /// `.hxml` plus lix lockfiles in `haxe_libraries/`
    Lix,
}

impl BuildSystem {
    /// Every build system, in display order.
    pub const ALL: [Self; 3] = [Self::Hxml, Self::Lime, Self::Lix];

    /// Name used in settings and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hxml => "hxml",
            Self::Lime => "lime",
            Self::Lix => "lix",
        }
    }

    /// Build-file names looked for in the project root, in order of preference.
    #[must_use]
    pub const fn default_file_names(self) -> &'static [&'static str] {
        match self {
            Self::Hxml | Self::Lix => &["build.hxml", "tests.hxml", "test.hxml"],
            Self::Lime => &["project.xml", "Project.xml"],
        }
    }

    /// Extension a manually chosen build file must have.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Hxml | Self::Lix => "hxml",
            Self::Lime => "xml",
        }
    }

    /// Whether `path` has this system's extension (case-insensitive).
    #[must_use]
    pub fn accepts(self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(self.extension()))
    }

    /// Guess the build system of a project from its layout.
    ///
    /// A `haxe_libraries` folder means lix; a Lime project file means Lime;
    /// anything else is treated as plain hxml.
    #[must_use]
    pub fn detect(project_root: &Path) -> Self {
        if lix::has_lockfiles(project_root) {
            Self::Lix
        } else if Self::Lime.default_file_names().iter().any(|name| project_root.join(name).is_file()) {
            Self::Lime
        } else {
            Self::Hxml
        }
    }
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildSystem {
    type Err = HxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|system| system.as_str().eq_ignore_ascii_case(s.trim())).ok_or_else(|| {
            HxError::ConfigError {
                message: format!("Unknown build system '{s}' (expected hxml, lime or lix)"),
            }
        })
    }
}

/// A project's build file.
#[derive(Debug)]
pub enum BuildFile {
    /// Plain argument file
    Hxml(HxmlFile),
    /// Lime project file
    Lime(LimeFile),
    /// Argument file in a lix project
    Lix(LixFile),
    /// Arguments synthesized for a lix project without an argument file
    Virtual(VirtualFile),
}

impl BuildFile {
    /// Build file of `system` at `location`.
    pub fn open(system: BuildSystem, project_root: &Path, location: impl Into<PathBuf>, flags: &FlagSet) -> Self {
        let location = location.into();
        match system {
            BuildSystem::Hxml => Self::Hxml(HxmlFile::new(project_root, location, flags.clone())),
            BuildSystem::Lime => Self::Lime(LimeFile::new(project_root, location)),
            BuildSystem::Lix => Self::Lix(LixFile::new(project_root, location, flags.clone())),
        }
    }

    /// First existing default build file of `system`; for lix projects without
    /// one, the virtual build file.
    #[must_use]
    pub fn find(system: BuildSystem, project_root: &Path, flags: &FlagSet) -> Option<Self> {
        let found = system
            .default_file_names()
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
            .map(|location| Self::open(system, project_root, location, flags));

        match found {
            Some(file) => Some(file),
            None if system == BuildSystem::Lix => Some(Self::Virtual(VirtualFile::new(project_root, flags.clone()))),
            None => None,
        }
    }

    /// [`find`](Self::find) with the build system guessed from the layout.
    #[must_use]
    pub fn detect(project_root: &Path, flags: &FlagSet) -> Option<Self> {
        Self::find(BuildSystem::detect(project_root), project_root, flags)
    }

    /// The convention this file follows. Virtual files are lix.
    #[must_use]
    pub const fn build_system(&self) -> BuildSystem {
        match self {
            Self::Hxml(_) => BuildSystem::Hxml,
            Self::Lime(_) => BuildSystem::Lime,
            Self::Lix(_) | Self::Virtual(_) => BuildSystem::Lix,
        }
    }

    /// Whether the file is synthesized rather than read from disk.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual(_))
    }

    /// Project directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        match self {
            Self::Hxml(file) => file.project_root(),
            Self::Lime(file) => file.project_root(),
            Self::Lix(file) => file.hxml().project_root(),
            Self::Virtual(file) => file.project_root(),
        }
    }

    /// Path of the build file. Virtual files report a path that does not exist.
    #[must_use]
    pub fn location(&self) -> PathBuf {
        match self {
            Self::Hxml(file) => file.location().to_path_buf(),
            Self::Lime(file) => file.location().to_path_buf(),
            Self::Lix(file) => file.hxml().location().to_path_buf(),
            Self::Virtual(file) => file.location(),
        }
    }

    /// Source paths as written, in order of first appearance, without duplicates.
    pub fn source_paths(&self) -> Result<Vec<PathBuf>> {
        let paths = match self {
            Self::Hxml(file) => file.source_paths(),
            Self::Lime(file) => file.source_paths()?,
            Self::Lix(file) => file.hxml().source_paths(),
            Self::Virtual(file) => file.source_paths(),
        };
        let mut seen = HashSet::new();
        Ok(paths.into_iter().filter(|path| seen.insert(path.clone())).collect())
    }

    /// Source paths joined to the project root.
    pub fn absolute_source_paths(&self) -> Result<Vec<PathBuf>> {
        let root = self.project_root();
        Ok(self.source_paths()?.into_iter().map(|path| root.join(path)).collect())
    }

    /// Library references declared by the file. Lix variants carry names only.
    pub fn library_specs(&self) -> Result<Vec<LibrarySpec>> {
        let names_only = |names: Vec<String>| {
            names
                .into_iter()
                .map(|name| LibrarySpec {
                    name,
                    version: None,
                })
                .collect()
        };
        Ok(match self {
            Self::Hxml(file) => file.library_specs(),
            Self::Lime(file) => file.library_specs()?,
            Self::Lix(file) => names_only(file.library_names()),
            Self::Virtual(file) => names_only(file.library_names()),
        })
    }

    /// Name from the project's own `haxelib.json`, when the project is itself a library.
    #[must_use]
    pub fn project_library_name(&self) -> Option<String> {
        let root = self.project_root();
        if !root.join(HAXELIB_MANIFEST).is_file() {
            return None;
        }
        HaxelibManifest::load(root).ok().map(|manifest| manifest.name)
    }

    /// Libraries named directly in the build file, resolved.
    ///
    /// Hxml and Lime files need a valid SDK. Libraries that cannot be
    /// resolved are reported to `progress` and left out.
    pub async fn direct_dependencies(
        &self,
        sdk: Option<&HaxeSdk>,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Haxelib>> {
        match self {
            Self::Hxml(_) | Self::Lime(_) => self.resolve_direct(&sdk_locator(sdk).await?, progress).await,
            Self::Lix(file) => self.resolve_direct(&file.locator(), progress).await,
            Self::Virtual(file) => self.resolve_direct(&file.locator(), progress).await,
        }
    }

    /// Direct dependencies and everything they depend on, excluding the project itself.
    pub async fn dependencies(
        &self,
        sdk: Option<&HaxeSdk>,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<Haxelib>> {
        match self {
            Self::Hxml(_) | Self::Lime(_) => self.resolve_closure(&sdk_locator(sdk).await?, progress).await,
            Self::Lix(file) => self.resolve_closure(&file.locator(), progress).await,
            Self::Virtual(file) => self.resolve_closure(&file.locator(), progress).await,
        }
    }

    async fn resolve_direct<L: LibraryLocator>(
        &self,
        locator: &L,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Haxelib>> {
        let specs = self.library_specs()?;
        let own_name = self.project_library_name();
        let root = self.project_root();

        let mut seen = HashSet::new();
        let mut libraries: Vec<Haxelib> = Vec::new();
        for spec in specs {
            if own_name.as_deref() == Some(spec.name.as_str()) {
                tracing::debug!(target: "build_file", "Skipping self-reference to {}", spec.name);
                continue;
            }
            if !seen.insert(spec.name.clone()) {
                continue;
            }
            if progress.is_cancelled() {
                return Err(HxError::Cancelled.into());
            }
            progress.set_task_name(&format!("Resolving {}", spec.name));

            match locator.locate(&spec.name, spec.version.as_deref(), progress).await {
                Ok(library) if library.location() == root => {}
                Ok(library) => {
                    if !libraries.contains(&library) {
                        libraries.push(library);
                    }
                }
                Err(e) if is_cancellation(&e) => return Err(e),
                Err(e) => progress.report_failure(&format!("Library '{}'", spec.name), &e),
            }
        }
        Ok(libraries)
    }

    async fn resolve_closure<L: LibraryLocator>(
        &self,
        locator: &L,
        progress: &dyn ProgressSink,
    ) -> Result<BTreeSet<Haxelib>> {
        let direct = self.resolve_direct(locator, progress).await?;
        let mut walk = DependencyWalk::from_direct(direct).exclude_location(self.project_root());
        if let Some(name) = self.project_library_name() {
            walk = walk.exclude_name(name);
        }
        walk.run(locator, progress).await
    }
}

async fn sdk_locator(sdk: Option<&HaxeSdk>) -> Result<SdkLocator> {
    let sdk = sdk.ok_or(HxError::SdkNotConfigured)?;
    sdk.ensure_valid().await?;
    Ok(SdkLocator::new(sdk.clone()))
}

/// Whether `path` is a build file, a library manifest, or a lockfile.
#[must_use]
pub fn is_build_related(path: &Path) -> bool {
    let is_manifest = path.file_name().is_some_and(|name| name == HAXELIB_MANIFEST);
    let in_lockfiles = path.components().any(|c| c.as_os_str() == LIX_LIBRARIES_DIR);
    is_manifest || in_lockfiles || BuildSystem::ALL.iter().any(|system| system.accepts(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{LibraryFixture, RecordingProgress};
    use tempfile::TempDir;

    #[test]
    fn test_detect_build_system() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        assert_eq!(BuildSystem::detect(root), BuildSystem::Hxml);

        std::fs::write(root.join("project.xml"), "<project/>").unwrap();
        assert_eq!(BuildSystem::detect(root), BuildSystem::Lime);

        std::fs::create_dir(root.join(LIX_LIBRARIES_DIR)).unwrap();
        assert_eq!(BuildSystem::detect(root), BuildSystem::Lix);
    }

    #[test]
    fn test_build_system_from_str() {
        assert_eq!("LIME".parse::<BuildSystem>().unwrap(), BuildSystem::Lime);
        assert_eq!(" hxml ".parse::<BuildSystem>().unwrap(), BuildSystem::Hxml);
        assert!("cmake".parse::<BuildSystem>().is_err());
    }

    #[test]
    fn test_accepts_extension() {
        assert!(BuildSystem::Hxml.accepts(Path::new("a/build.HXML")));
        assert!(BuildSystem::Lime.accepts(Path::new("project.xml")));
        assert!(!BuildSystem::Lime.accepts(Path::new("project.hxml")));
    }

    #[test]
    fn test_find_prefers_first_default_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test.hxml"), "-cp test").unwrap();
        std::fs::write(temp.path().join("build.hxml"), "-cp src").unwrap();

        let file = BuildFile::find(BuildSystem::Hxml, temp.path(), &FlagSet::default()).unwrap();
        assert_eq!(file.location(), temp.path().join("build.hxml"));
    }

    #[test]
    fn test_find_virtual_only_for_lix() {
        let temp = TempDir::new().unwrap();
        assert!(BuildFile::find(BuildSystem::Hxml, temp.path(), &FlagSet::default()).is_none());
        assert!(BuildFile::find(BuildSystem::Lime, temp.path(), &FlagSet::default()).is_none());

        let file = BuildFile::find(BuildSystem::Lix, temp.path(), &FlagSet::default()).unwrap();
        assert!(file.is_virtual());
        assert_eq!(file.build_system(), BuildSystem::Lix);
    }

    #[test]
    fn test_source_paths_deduplicated_in_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.hxml"), "-cp src -cp lib -p src\n").unwrap();
        let file = BuildFile::detect(temp.path(), &FlagSet::default()).unwrap();
        assert_eq!(file.source_paths().unwrap(), [PathBuf::from("src"), PathBuf::from("lib")]);
        assert_eq!(file.absolute_source_paths().unwrap()[0], temp.path().join("src"));
    }

    #[test]
    fn test_hxml_and_lime_agree_on_source_paths() {
        let temp = TempDir::new().unwrap();
        let hxml_root = temp.path().join("hxml");
        let lime_root = temp.path().join("lime");
        std::fs::create_dir_all(&hxml_root).unwrap();
        std::fs::create_dir_all(&lime_root).unwrap();
        std::fs::write(
            hxml_root.join("build.hxml"),
            "-cp src\n-p \"dir/another src\"\n# -cp commented-out-src\n--class-path \"dir/yet another src\"\n",
        )
        .unwrap();
        std::fs::write(
            lime_root.join("project.xml"),
            "<project><source path=\"src\"/><source path=\"dir/another src\"/><source path=\"dir/yet another src\"/></project>",
        )
        .unwrap();

        let hxml = BuildFile::detect(&hxml_root, &FlagSet::default()).unwrap();
        let lime = BuildFile::detect(&lime_root, &FlagSet::default()).unwrap();
        assert_eq!(lime.build_system(), BuildSystem::Lime);
        assert_eq!(hxml.source_paths().unwrap(), lime.source_paths().unwrap());
    }

    #[tokio::test]
    async fn test_hxml_without_sdk_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.hxml"), "-lib format").unwrap();
        let file = BuildFile::detect(temp.path(), &FlagSet::default()).unwrap();
        let progress = RecordingProgress::default();

        let err = file.dependencies(None, &progress).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<HxError>(), Some(HxError::SdkNotConfigured)));
    }

    /// Lix project whose lockfiles point at libraries under `<root>/vendor`.
    fn lix_project(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("game");
        std::fs::create_dir_all(root.join(LIX_LIBRARIES_DIR)).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        let lockfile = |name: &str| {
            std::fs::write(
                root.join(LIX_LIBRARIES_DIR).join(format!("{name}.hxml")),
                format!("-cp ${{SCOPE_DIR}}/vendor/{name}/src\n-D {name}=1.0.0\n"),
            )
            .unwrap();
        };
        for name in ["heaps", "format", "hxbit"] {
            lockfile(name);
            let dir = root.join("vendor").join(name);
            std::fs::create_dir_all(dir.join("src")).unwrap();
        }
        LibraryFixture::new("heaps").dependency("format", "").dependency("game", "").write_to(&root.join("vendor/heaps"));
        LibraryFixture::new("format").write_to(&root.join("vendor/format"));
        LibraryFixture::new("hxbit").write_to(&root.join("vendor/hxbit"));
        LibraryFixture::new("game").write_to(&root);
        root
    }

    #[tokio::test]
    async fn test_virtual_lix_closure() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let file = BuildFile::detect(&root, &FlagSet::default()).unwrap();
        assert!(file.is_virtual());

        let progress = RecordingProgress::default();
        let direct = file.direct_dependencies(None, &progress).await.unwrap();
        assert_eq!(direct.iter().map(Haxelib::name).collect::<Vec<_>>(), ["format", "heaps", "hxbit"]);

        let all = file.dependencies(None, &progress).await.unwrap();
        let mut names: Vec<&str> = all.iter().map(Haxelib::name).collect();
        names.sort_unstable();
        // `game` is the project itself and never its own dependency.
        assert_eq!(names, ["format", "heaps", "hxbit"]);
        assert!(progress.failures().is_empty());
    }

    #[tokio::test]
    async fn test_lix_file_reports_missing_lockfile() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        std::fs::write(root.join("build.hxml"), "-cp src\n-lib heaps\n-lib missing\n").unwrap();
        let file = BuildFile::detect(&root, &FlagSet::default()).unwrap();
        assert!(matches!(file, BuildFile::Lix(_)));

        let progress = RecordingProgress::default();
        let all = file.dependencies(None, &progress).await.unwrap();
        let mut names: Vec<&str> = all.iter().map(Haxelib::name).collect();
        names.sort_unstable();
        assert_eq!(names, ["format", "heaps"]);
        assert_eq!(progress.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = lix_project(&temp);
        let file = BuildFile::detect(&root, &FlagSet::default()).unwrap();
        let progress = RecordingProgress::default();

        let first = file.dependencies(None, &progress).await.unwrap();
        let second = file.dependencies(None, &progress).await.unwrap();
        assert_eq!(
            first.iter().map(Haxelib::location).collect::<Vec<_>>(),
            second.iter().map(Haxelib::location).collect::<Vec<_>>()
        );
        assert_eq!(file.source_paths().unwrap(), file.source_paths().unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hxml_resolves_through_sdk_and_skips_failures() {
        let temp = TempDir::new().unwrap();
        let fake = crate::test_utils::FakeSdk::create(&temp.path().join("toolchain"), "4.3.6");
        let cache = fake.library_cache();
        LibraryFixture::new("hscript").version("2.5.0").install_current(&cache);
        LibraryFixture::new("format").version("3.5.0").dependency("hscript", "").install_current(&cache);
        fake.set_install_mode("fail");

        let project = temp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("build.hxml"), "-cp src\n-lib format\n-lib nonexistent\n").unwrap();

        let file = BuildFile::detect(&project, &FlagSet::default()).unwrap();
        let progress = RecordingProgress::default();
        let all = file.dependencies(Some(&fake.sdk()), &progress).await.unwrap();

        let locations: Vec<PathBuf> = all.iter().map(|l| l.location().to_path_buf()).collect();
        assert_eq!(locations, [cache.join("format/3,5,0"), cache.join("hscript/2,5,0")]);
        assert_eq!(progress.failures().len(), 1);
        assert!(progress.failures()[0].contains("nonexistent"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_sdk_probe_keeps_runtime_responsive() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let temp = TempDir::new().unwrap();
        let sdk_root = temp.path().join("slow-haxe");
        crate::test_utils::write_script(&sdk_root.join("haxe"), "sleep 1\necho 4.3.6\n");
        let project = temp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("build.hxml"), "-cp src\n").unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let file = BuildFile::detect(&project, &FlagSet::default()).unwrap();
        let sdk = HaxeSdk::new("slow", &sdk_root);
        let progress = RecordingProgress::default();
        let all = file.dependencies(Some(&sdk), &progress).await.unwrap();
        ticker.abort();

        assert!(all.is_empty());
        // The probe takes a second; a runtime left free ticks about fifty times.
        let ticks = ticks.load(Ordering::SeqCst);
        assert!(ticks >= 10, "runtime stalled during the probe ({ticks} ticks)");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lime_resolves_through_sdk_and_skips_failures() {
        let temp = TempDir::new().unwrap();
        let fake = crate::test_utils::FakeSdk::create(&temp.path().join("toolchain"), "4.3.6");
        let cache = fake.library_cache();
        LibraryFixture::new("lime").version("8.1.2").install_current(&cache);
        LibraryFixture::new("openfl").version("9.3.3").dependency("lime", "").install_version(&cache);
        fake.set_install_mode("fail");

        let project = temp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("project.xml"),
            r#"<project>
    <source path="src" />
    <haxelib name="openfl" version="9.3.3" />
    <haxelib name="actuate" />
</project>"#,
        )
        .unwrap();

        let file = BuildFile::detect(&project, &FlagSet::default()).unwrap();
        assert_eq!(file.build_system(), BuildSystem::Lime);
        let progress = RecordingProgress::default();

        let direct = file.direct_dependencies(Some(&fake.sdk()), &progress).await.unwrap();
        assert_eq!(direct.iter().map(Haxelib::name).collect::<Vec<_>>(), ["openfl"]);
        assert_eq!(progress.failures().len(), 1);
        assert!(progress.failures()[0].contains("actuate"));

        let all = file.dependencies(Some(&fake.sdk()), &progress).await.unwrap();
        let locations: Vec<PathBuf> = all.iter().map(|l| l.location().to_path_buf()).collect();
        assert_eq!(locations, [cache.join("lime/8,1,2"), cache.join("openfl/9,3,3")]);
        assert_eq!(fake.install_calls(), ["install actuate --always", "install actuate --always"]);
    }

    #[test]
    fn test_is_build_related() {
        assert!(is_build_related(Path::new("/p/build.hxml")));
        assert!(is_build_related(Path::new("/p/project.xml")));
        assert!(is_build_related(Path::new("/p/lib/haxelib.json")));
        assert!(is_build_related(Path::new("/p/haxe_libraries/tink_core.hxml")));
        assert!(!is_build_related(Path::new("/p/src/Main.hx")));
    }
}
