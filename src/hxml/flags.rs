//! Option flags recognised when scanning argument lists.
//!
//! Which flags introduce a class path or a library is configuration data, not
//! part of the tokenizer: a newer compiler adding a synonym only needs a new
//! entry in `[flags]` of the global config.

use serde::{Deserialize, Serialize};

fn default_library_flags() -> Vec<String> {
    ["-lib", "-L", "--library"].map(String::from).to_vec()
}

fn default_class_path_flags() -> Vec<String> {
    ["-cp", "-p", "--class-path"].map(String::from).to_vec()
}

/// The flags that take a library or a class path as their next argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    /// Flags followed by `name` or `name:version`.
    #[serde(default = "default_library_flags")]
    pub library: Vec<String>,

    /// Flags followed by a source directory.
    #[serde(default = "default_class_path_flags")]
    pub class_path: Vec<String>,
}

impl Default for FlagSet {
    fn default() -> Self {
        Self {
            library: default_library_flags(),
            class_path: default_class_path_flags(),
        }
    }
}

impl FlagSet {
    /// Values following any class-path flag, in order of appearance.
    #[must_use]
    pub fn class_paths<'a>(&self, tokens: &'a [String]) -> Vec<&'a str> {
        values_after(&self.class_path, tokens)
    }

    /// Values following any library flag, in order of appearance.
    #[must_use]
    pub fn libraries<'a>(&self, tokens: &'a [String]) -> Vec<&'a str> {
        values_after(&self.library, tokens)
    }

    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A library reference as written after `-lib`: `name` or `name:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySpec {
    /// Library name
    pub name: String,
    /// Requested version, `None` for "whatever is current"
    pub version: Option<String>,
}

impl LibrarySpec {
    /// Split on the first colon.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some((name, version)) => Self {
                name: name.to_string(),
                version: non_empty(version),
            },
            None => Self {
                name: value.to_string(),
                version: None,
            },
        }
    }
}

/// Treat empty version strings as "any version".
pub(crate) fn non_empty(version: &str) -> Option<String> {
    let version = version.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

fn values_after<'a>(flags: &[String], tokens: &'a [String]) -> Vec<&'a str> {
    let mut values = Vec::new();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        if flags.iter().any(|flag| flag == token) {
            if let Some(value) = iter.next() {
                values.push(value.as_str());
            }
        }
    }
    values
}
