use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{create_s3_store, S3ClientConfig};
use crate::{
    adapters::outbound::storage::{apache_object_store_adapter::ApacheBucketStore, error::build_error},
    domain::{errors::RepositoryResult, value_objects::BucketName},
    ports::storage::{BucketStore, ObjectStoreClient},
};

/// ObjectStoreClient for AWS S3 using credentials from the execution
/// environment (instance role, task role, environment variables)
#[derive(Debug, Clone, Default)]
pub struct AmbientS3Client {
    config: S3ClientConfig,
}

impl AmbientS3Client {
    pub fn new(config: S3ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &S3ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ObjectStoreClient for AmbientS3Client {
    #[instrument(skip(self, bucket), fields(%bucket))]
    async fn open_bucket(&self, bucket: &BucketName) -> RepositoryResult<Arc<dyn BucketStore>> {
        let store = create_s3_store(&self.config, bucket).map_err(|e| build_error(e, bucket))?;

        let handle = ApacheBucketStore::new(bucket.clone(), store);
        handle.verify().await?;

        debug!(endpoint = ?self.config.endpoint, "opened S3 bucket");
        Ok(Arc::new(handle))
    }
}
