use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::{domain::errors::StorageResult, ports::storage::ObjectStream};

/// The file-fetching contract the package manager uses for every mirror.
///
/// `url` is either relative to the repository base URL or absolute.
#[async_trait]
pub trait FileGrabber: Send + Sync {
    /// Copy the remote file to the local filesystem, returning the path written
    async fn urlgrab(&self, url: &str, filename: Option<&Path>) -> StorageResult<PathBuf>;

    /// Open the remote file for reading
    async fn urlopen(&self, url: &str) -> StorageResult<ObjectStream>;

    /// Return the contents of the remote file
    async fn urlread(&self, url: &str, limit: Option<u64>) -> StorageResult<Bytes>;
}
