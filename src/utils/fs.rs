//! File system helpers shared by the settings stores and the resolvers.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

/// Create a directory and all of its parents if they do not exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Safely writes a string to a file using atomic operations.
///
/// See [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content goes to a temporary file in the same directory, is synced to
/// disk, and is then persisted over the target path, so readers never observe
/// a partially written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.as_file().sync_all().context("Failed to sync file to disk")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Read the first line of a marker file, trimmed.
///
/// Returns `None` when the file is missing, unreadable, or its first line is blank.
pub fn read_first_line(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let line = content.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Last modification time of a path, if it can be read.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/settings.toml");
        safe_write(&target, "key = \"value\"\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "key = \"value\"\n");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("file.txt");
        safe_write(&target, "old").unwrap();
        safe_write(&target, "new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_read_first_line() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join(".current");
        assert_eq!(read_first_line(&marker), None);

        fs::write(&marker, "  1.2.3  \nignored\n").unwrap();
        assert_eq!(read_first_line(&marker).as_deref(), Some("1.2.3"));

        fs::write(&marker, "\n").unwrap();
        assert_eq!(read_first_line(&marker), None);
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "").unwrap();
        assert!(ensure_dir(&file).is_err());
        ensure_dir(&temp.path().join("dir")).unwrap();
        assert!(temp.path().join("dir").is_dir());
    }
}
