//! Writing generated files.
//!
//! Files are replaced atomically, and a file whose content is already up to
//! date is not touched, so repeated runs leave timestamps alone.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of writing one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// Existing content already matched.
    Unchanged,
}

/// A generated file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn hash(&self) -> u64 {
        xxh3_64(self.content.as_bytes())
    }

    /// Whether the file on disk already holds this content.
    pub fn is_current(&self) -> bool {
        match fs::read(&self.path) {
            Ok(existing) => {
                xxh3_64(&existing) == self.hash() && existing == self.content.as_bytes()
            }
            Err(_) => false,
        }
    }

    /// Write the file, creating parent directories as needed.
    pub fn write(&self) -> Result<WriteResult, OutputError> {
        if self.is_current() {
            return Ok(WriteResult::Unchanged);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        atomic_write(&self.path, self.content.as_bytes()).map_err(|source| OutputError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(WriteResult::Written)
    }
}

/// Tempfile in the target directory, fsync, then rename over the target.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen/Sample/a.gen.h");
        let file = GeneratedFile::new(&path, "#pragma once\n");

        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#pragma once\n");
    }

    #[test]
    fn test_rewrite_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.gen.h");
        let file = GeneratedFile::new(&path, "content\n");

        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert!(file.is_current());
        assert_eq!(file.write().unwrap(), WriteResult::Unchanged);

        let changed = GeneratedFile::new(&path, "other\n");
        assert!(!changed.is_current());
        assert_eq!(changed.write().unwrap(), WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "other\n");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.gen.h");
        atomic_write(&path, b"x").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let file = GeneratedFile::new(blocker.join("a.gen.h"), "x");
        assert!(matches!(file.write(), Err(OutputError::CreateDir { .. })));
    }
}
