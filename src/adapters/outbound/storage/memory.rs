use async_trait::async_trait;
use bytes::Bytes;
use object_store::{memory::InMemory, path::Path as ObjectPath, ObjectStore as _, PutPayload};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::apache_object_store_adapter::ApacheBucketStore;
use crate::{
    domain::{
        errors::{RepositoryError, RepositoryResult, StorageError, StorageResult},
        value_objects::BucketName,
    },
    ports::storage::{BucketStore, ObjectStoreClient},
};

/// In-memory implementation of ObjectStoreClient for testing and development.
///
/// Buckets exist only once created (explicitly or by seeding an object), so
/// opening an unknown bucket behaves like a missing S3 bucket.
#[derive(Clone, Default)]
pub struct InMemoryObjectStoreClient {
    buckets: Arc<RwLock<HashMap<BucketName, Arc<InMemory>>>>,
}

impl InMemoryObjectStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `bucket` if it does not exist yet
    pub async fn create_bucket(&self, bucket: &BucketName) -> Arc<InMemory> {
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(bucket.clone())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone()
    }

    /// Store `data` under `key`, creating the bucket on demand
    pub async fn put_object(
        &self,
        bucket: &BucketName,
        key: &str,
        data: impl Into<Bytes>,
    ) -> StorageResult<()> {
        let path = ObjectPath::parse(key).map_err(|e| StorageError::Backend {
            message: format!("Invalid object key '{}': {}", key, e),
        })?;

        let store = self.create_bucket(bucket).await;
        store
            .put(&path, PutPayload::from(data.into()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStoreClient {
    async fn open_bucket(&self, bucket: &BucketName) -> RepositoryResult<Arc<dyn BucketStore>> {
        let buckets = self.buckets.read().await;
        let store = buckets
            .get(bucket)
            .cloned()
            .ok_or_else(|| RepositoryError::BucketNotFound {
                bucket: bucket.to_string(),
                message: "no such bucket".to_string(),
            })?;

        Ok(Arc::new(ApacheBucketStore::new(bucket.clone(), store)))
    }
}
