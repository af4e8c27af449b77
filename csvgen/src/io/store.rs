//! Durable artifact writes into the shared upload directory.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::StorageWriteError;

/// The shared upload directory, seen from the writer side.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StorageWriteError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageWriteError {
                path: self.dir.clone(),
                source,
            })
    }

    /// Write a new artifact and flush it to storage.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] instead of overwriting an
    /// existing file. Returns only once the contents are synced to disk; a
    /// partially written file is removed before the error is returned.
    pub async fn create(
        &self,
        name: &str,
        contents: &[u8],
    ) -> Result<PathBuf, StorageWriteError> {
        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| StorageWriteError {
                path: path.clone(),
                source,
            })?;

        if let Err(source) = write_all_synced(&mut file, contents).await {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial artifact");
            }
            return Err(StorageWriteError { path, source });
        }

        Ok(path)
    }
}

async fn write_all_synced(file: &mut fs::File, contents: &[u8]) -> io::Result<()> {
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await
}
