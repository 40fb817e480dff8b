use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{path::Path as ObjectPath, ObjectStore as ApacheObjectStore};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tracing::debug;

use super::error::{fetch_error, open_error};
use crate::{
    domain::{
        errors::{RepositoryResult, StorageError, StorageResult},
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::{BucketStore, ObjectStream},
};

/// Object path for `key`, verbatim (`Path::from` would percent-encode `~`, `^`, ...).
/// A key object_store cannot address is reported as missing.
fn object_path(key: &ObjectKey) -> StorageResult<ObjectPath> {
    ObjectPath::parse(key.as_str()).map_err(|_| StorageError::ObjectNotFound {
        key: key.to_string(),
    })
}

/// Adapter that implements our BucketStore trait using Apache object_store
pub struct ApacheBucketStore {
    bucket: BucketName,
    inner: Arc<dyn ApacheObjectStore>,
}

impl ApacheBucketStore {
    pub fn new(bucket: BucketName, store: Arc<dyn ApacheObjectStore>) -> Self {
        Self {
            bucket,
            inner: store,
        }
    }

    /// Issue one listing at the bucket root so that missing buckets and
    /// refused credentials surface when the repository is set up rather than
    /// on its first fetch.
    pub async fn verify(&self) -> RepositoryResult<()> {
        self.inner
            .list_with_delimiter(None)
            .await
            .map_err(|e| open_error(e, &self.bucket))?;

        debug!(bucket = %self.bucket, "bucket reachable");
        Ok(())
    }
}

#[async_trait]
impl BucketStore for ApacheBucketStore {
    fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    async fn get_object(&self, key: &ObjectKey) -> StorageResult<Bytes> {
        let path = object_path(key)?;

        let result = self
            .inner
            .get(&path)
            .await
            .map_err(|e| fetch_error(e, key))?;

        let bytes = result.bytes().await.map_err(|e| fetch_error(e, key))?;

        Ok(bytes)
    }

    async fn get_object_stream(&self, key: &ObjectKey) -> StorageResult<ObjectStream> {
        let path = object_path(key)?;

        let result = self
            .inner
            .get(&path)
            .await
            .map_err(|e| fetch_error(e, key))?;

        let stream = result
            .into_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

        Ok(Box::new(StreamReader::new(stream)))
    }
}
