use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::domain::{
    errors::{RepositoryResult, StorageResult},
    value_objects::{BucketName, ObjectKey},
};

/// Readable object content, streamed from the backend rather than buffered
pub type ObjectStream = Box<dyn tokio::io::AsyncRead + Send + Unpin>;

/// Port for the object-store client a repository fetches through.
///
/// Implementations resolve their own credentials; callers only ever name a
/// bucket.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + 'static {
    /// Open a handle to `bucket`, failing if it cannot be reached with the
    /// resolved credentials
    async fn open_bucket(&self, bucket: &BucketName) -> RepositoryResult<Arc<dyn BucketStore>>;
}

/// Port for read access to a single bucket
#[async_trait]
pub trait BucketStore: Send + Sync + 'static {
    /// Name of the bucket this handle reads from
    fn bucket(&self) -> &BucketName;

    /// Retrieve the whole object
    async fn get_object(&self, key: &ObjectKey) -> StorageResult<Bytes>;

    /// Open the object for streaming reads
    async fn get_object_stream(&self, key: &ObjectKey) -> StorageResult<ObjectStream>;
}
