//! Integration tests for `hxdeps config` and `hxdeps check`.

mod common;

use common::TestEnv;
use hxdeps::project::settings::settings_path;
use hxdeps::test_utils::LibraryFixture;
use predicates::prelude::*;

#[test]
fn test_show_defaults() {
    let env = TestEnv::new();
    env.write("project.xml", "<project><source path=\"src\"/></project>");

    env.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build_system  (unset)"))
        .stdout(predicate::str::contains("build system  lime"))
        .stdout(predicate::str::contains("project.xml"));
}

#[test]
fn test_set_build_system_and_pinned_file() {
    let env = TestEnv::new();
    env.write("build.hxml", "-cp src\n");
    env.write("release.hxml", "-cp release\n");

    env.cmd().args(["config", "set", "build_file", "release.hxml"]).assert().success();
    env.cmd().args(["sources", "--relative"]).assert().success().stdout("release\n");

    let settings = std::fs::read_to_string(settings_path(&env.project())).unwrap();
    assert!(settings.contains("build_file = \"release.hxml\""));

    env.cmd().args(["config", "unset", "build_file"]).assert().success();
    env.cmd().args(["sources", "--relative"]).assert().success().stdout("src\n");
}

#[test]
fn test_set_same_value_twice() {
    let env = TestEnv::new();
    env.cmd().args(["config", "set", "auto_build", "true"]).assert().success();
    env.cmd()
        .args(["config", "set", "auto_build", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed"));
}

#[test]
fn test_set_rejects_invalid_values() {
    let env = TestEnv::new();
    env.cmd()
        .args(["config", "set", "build_system", "cmake"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cmake"));
    env.cmd().args(["config", "set", "colour", "blue"]).assert().failure();
}

#[test]
fn test_alt_sdk_warns_when_unregistered() {
    let env = TestEnv::new();
    env.cmd()
        .args(["config", "set", "alt_sdk", "nightly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not registered"));
}

#[test]
fn test_check_ignores_unrelated_files() {
    let env = TestEnv::new();
    env.write("build.hxml", "-cp src\n");

    env.cmd()
        .args(["check", "src/Main.hx", "README.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No build inputs changed"));
}

#[test]
fn test_check_refreshes_on_lockfile_change() {
    let env = TestEnv::new();
    env.lix_library(&LibraryFixture::new("format"));
    env.write("build.hxml", "-cp src\n-lib format\n");

    env.cmd()
        .args(["check", "--kind", "added", "haxe_libraries/format.hxml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Refreshed: 1 source path(s), 1 library"));
}
