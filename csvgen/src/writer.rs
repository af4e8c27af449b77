//! Artifact writer: validated rows in, durable CSV file and public URL out.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::ServiceConfig;
use crate::core::encode::encode_csv;
use crate::core::naming::random_artifact_name;
use crate::core::request::{Rows, rows_from_body, rows_from_payload};
use crate::error::{GenerateError, StorageWriteError};
use crate::io::store::ArtifactStore;

/// Fresh names drawn before a collision is reported as a storage failure.
pub const MAX_NAME_ATTEMPTS: usize = 3;

/// A CSV file that has been written and synced to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    store: ArtifactStore,
    config: ServiceConfig,
}

impl ArtifactWriter {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            store: ArtifactStore::new(config.upload_dir.clone()),
            config,
        }
    }

    /// Validate a raw request body and write it as an artifact.
    pub async fn generate_from_body(
        &self,
        body: &[u8],
    ) -> Result<GeneratedArtifact, GenerateError> {
        let rows = rows_from_body(body)?;
        self.write_rows(&rows).await
    }

    /// Validate a parsed `{"data": ...}` payload and write it as an artifact.
    pub async fn generate(&self, payload: &Value) -> Result<GeneratedArtifact, GenerateError> {
        let rows = rows_from_payload(payload)?;
        self.write_rows(&rows).await
    }

    /// Encode `rows` and store them under a fresh random name.
    ///
    /// Resolves only after the file is synced. Nothing is returned for a
    /// write that did not complete.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub async fn write_rows(&self, rows: &Rows) -> Result<GeneratedArtifact, GenerateError> {
        self.store.ensure_dir().await?;

        let contents = encode_csv(rows).map_err(|source| StorageWriteError {
            path: self.store.dir().to_path_buf(),
            source,
        })?;

        let mut attempt = 1;
        loop {
            let name = random_artifact_name(&mut rand::thread_rng());
            match self.store.create(&name, &contents).await {
                Ok(path) => {
                    info!(path = %path.display(), bytes = contents.len(), "CSV file created");
                    let url = self.config.artifact_url(&name);
                    return Ok(GeneratedArtifact { name, path, url });
                }
                Err(err)
                    if err.source.kind() == io::ErrorKind::AlreadyExists
                        && attempt < MAX_NAME_ATTEMPTS =>
                {
                    warn!(name = %name, attempt, "artifact name collision, drawing a new name");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
