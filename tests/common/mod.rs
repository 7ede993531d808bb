//! Shared helpers for the hxdeps integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use hxdeps::constants::LIX_LIBRARIES_DIR;
use hxdeps::test_utils::{LibraryFixture, write_file};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch area with a project directory and an isolated global config.
pub struct TestEnv {
    pub temp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        hxdeps::test_utils::init_test_logging(None);
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("project")).unwrap();
        Self {
            temp,
        }
    }

    pub fn project(&self) -> PathBuf {
        self.temp.path().join("project")
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp.path().join("config.toml")
    }

    /// `hxdeps` pointed at this environment's project and config.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hxdeps").unwrap();
        cmd.env("HXDEPS_CONFIG_PATH", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("HAXELIB_PATH")
            .env_remove("HAXE_LIBCACHE")
            .arg("--no-progress")
            .arg("--project")
            .arg(self.project());
        cmd
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project().join(relative);
        write_file(&path, content);
        path
    }

    /// A library checked out at `<temp>/libs/<name>` and pinned by a lix lockfile.
    pub fn lix_library(&self, fixture: &LibraryFixture) -> PathBuf {
        let dir = fixture.write_to(&self.temp.path().join("libs").join(fixture.name()));
        self.write(
            &format!("{LIX_LIBRARIES_DIR}/{}.hxml", fixture.name()),
            &format!("-cp {}\n", dir.join("src").display()),
        );
        dir
    }
}

pub fn contains_path(path: &Path) -> predicates::str::ContainsPredicate {
    predicates::str::contains(path.display().to_string())
}
