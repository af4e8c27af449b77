//! Directory operations used by a sweep pass.
//!
//! The [`ArtifactDir`] trait decouples the sweep from the real filesystem.
//! Tests use scripted directories that fail on chosen entries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub trait ArtifactDir: Send + Sync {
    /// Directory being swept, for log messages.
    fn location(&self) -> &Path;

    /// Candidate entries. Subdirectories are not candidates.
    fn list(&self) -> io::Result<Vec<PathBuf>>;

    /// Creation time of `path`.
    fn created(&self, path: &Path) -> io::Result<SystemTime>;

    /// Delete `path`. Deleting an entry that is already gone succeeds.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// [`ArtifactDir`] over a real directory.
#[derive(Debug, Clone)]
pub struct FsArtifactDir {
    dir: PathBuf,
}

impl FsArtifactDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactDir for FsArtifactDir {
    fn location(&self) -> &Path {
        &self.dir
    }

    fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            // Unknown file types are still listed; a failing stat is reported per entry later.
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let meta = fs::metadata(path)?;
        // Not every filesystem records birth time.
        meta.created().or_else(|_| meta.modified())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
