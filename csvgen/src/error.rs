//! Error taxonomy for the writer and sweeper.
//!
//! Request-path errors ([`GenerateError`]) end a single request with a
//! structured response. Sweep errors ([`SweepError`]) stay inside the
//! background job: they are logged and never reach a client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fixed client-facing message for malformed generation requests.
pub const INVALID_DATA_MESSAGE: &str = "Invalid data. Expected an array of arrays.";

/// Client-facing message when the artifact could not be stored.
pub const STORAGE_FAILURE_MESSAGE: &str = "Failed to generate CSV file.";

/// The request payload is not a non-empty array whose first element is an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid data. Expected an array of arrays.")]
pub struct ValidationError;

/// Filesystem failure while creating an artifact.
#[derive(Debug, Error)]
#[error("write artifact {}: {source}", .path.display())]
pub struct StorageWriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageWriteError),
}

impl GenerateError {
    /// Message safe to show to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => INVALID_DATA_MESSAGE,
            Self::Storage(_) => STORAGE_FAILURE_MESSAGE,
        }
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    /// The artifact directory could not be listed; the pass is abandoned.
    #[error("list {}: {source}", .dir.display())]
    Enumeration {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A single entry could not be inspected or removed; the pass continues.
    #[error("sweep entry {}: {source}", .path.display())]
    Entry {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_is_the_public_message() {
        assert_eq!(ValidationError.to_string(), INVALID_DATA_MESSAGE);
        let err = GenerateError::from(ValidationError);
        assert_eq!(err.to_string(), INVALID_DATA_MESSAGE);
        assert_eq!(err.public_message(), INVALID_DATA_MESSAGE);
    }

    #[test]
    fn storage_error_hides_path_from_caller() {
        let err = GenerateError::from(StorageWriteError {
            path: PathBuf::from("/srv/uploads/abc.csv"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(err.to_string().contains("/srv/uploads/abc.csv"));
        assert_eq!(err.public_message(), STORAGE_FAILURE_MESSAGE);
    }
}
