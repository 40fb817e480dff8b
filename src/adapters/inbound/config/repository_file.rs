use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tracing::debug;

use crate::domain::models::RepositoryDescriptor;

#[derive(ThisError, Debug)]
pub enum RepositoryFileError {
    #[error("Failed to read repository file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse repository file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the host's repository descriptors from a JSON file holding an array
/// of repositories
pub async fn load_repository_file(
    path: &Path,
) -> Result<Vec<RepositoryDescriptor>, RepositoryFileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RepositoryFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let descriptors =
        parse_repositories(&content).map_err(|source| RepositoryFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), count = descriptors.len(), "loaded repository file");
    Ok(descriptors)
}

pub fn parse_repositories(content: &str) -> Result<Vec<RepositoryDescriptor>, serde_json::Error> {
    serde_json::from_str(content)
}
