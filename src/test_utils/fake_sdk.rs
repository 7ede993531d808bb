//! Shell-script stand-ins for a Haxe installation.
//!
//! Layout created under the base directory:
//!
//! ```text
//! <base>/haxe/haxe          prints the version, counts invocations
//! <base>/haxe/haxelib       `install <name> [<version>] --always`
//! <base>/neko/neko          prints the NekoVM banner
//! ```
//!
//! The installer's behaviour is switched by `<base>/haxe/install-mode`:
//! empty installs into `$HAXELIB_PATH`, `fail` exits 1, `noop` exits 0
//! without installing, `hang` sleeps until killed.

use super::write_script;
use crate::toolchain::HaxeSdk;
use std::path::{Path, PathBuf};

const HAXELIB_SCRIPT: &str = r#"dir=$(dirname "$0")
echo "$@" >> "$dir/install-log"
mode=$(cat "$dir/install-mode" 2>/dev/null)
case "$mode" in
  fail) echo "Error: No such library $2"; exit 1 ;;
  noop) echo "Nothing to do"; exit 0 ;;
  hang) exec sleep 30 ;;
esac
name="$2"
version="$3"
if [ -z "$version" ] || [ "$version" = "--always" ]; then version="1.0.0"; fi
target="$HAXELIB_PATH/$name/$(echo "$version" | tr . ,)"
mkdir -p "$target"
printf '{"name":"%s","version":"%s"}\n' "$name" "$version" > "$target/haxelib.json"
printf '%s' "$version" > "$HAXELIB_PATH/$name/.current"
echo "Downloading $name-$version.zip..."
echo "Installed $name $version"
"#;

/// A fake SDK rooted at `<base>/haxe`.
#[derive(Debug, Clone)]
pub struct FakeSdk {
    /// Install root
    pub root: PathBuf,
}

impl FakeSdk {
    /// Create the scripts under `base`; `haxe -version` will print `version`.
    pub fn create(base: &Path, version: &str) -> Self {
        let root = base.join("haxe");
        write_script(&root.join("haxe"), &format!("echo x >> \"$(dirname \"$0\")/probe-count\"\necho '{version}'\n"));
        write_script(&root.join("haxelib"), HAXELIB_SCRIPT);
        write_script(&base.join("neko/neko"), "echo 'NekoVM 2.3.0 (c)2005-2019 Haxe Foundation'\nexit 1\n");
        Self {
            root,
        }
    }

    /// Handle for the fake SDK.
    pub fn sdk(&self) -> HaxeSdk {
        HaxeSdk::new("fake", &self.root)
    }

    /// Repository the fake installer writes into.
    pub fn library_cache(&self) -> PathBuf {
        self.sdk().library_cache_dir()
    }

    /// How many times `haxe` was run.
    pub fn probe_count(&self) -> usize {
        std::fs::read_to_string(self.root.join("probe-count")).map(|s| s.lines().count()).unwrap_or(0)
    }

    /// Switch the installer behaviour (`fail`, `noop`, `hang`, or `""`).
    pub fn set_install_mode(&self, mode: &str) {
        std::fs::write(self.root.join("install-mode"), mode).expect("write install mode");
    }

    /// Argument lines of every installer run.
    pub fn install_calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.root.join("install-log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
