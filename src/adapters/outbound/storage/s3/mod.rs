//! S3 storage client built on the object_store crate
//!
//! Credentials are never passed in by callers: `AmazonS3Builder::from_env`
//! resolves them from `AWS_*` environment variables, the web-identity token
//! file, the container credentials endpoint or the EC2 instance metadata
//! service, in that order.

pub mod ambient_client;

pub use ambient_client::AmbientS3Client;

use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;

use crate::domain::value_objects::BucketName;

/// Configuration for the S3 client.
///
/// Everything is optional; an empty config resolves region and credentials
/// from the environment.
#[derive(Clone, Default, bon::Builder)]
pub struct S3ClientConfig {
    /// Region override; otherwise `AWS_REGION` / `AWS_DEFAULT_REGION`
    #[builder(into)]
    pub region: Option<String>,

    /// Endpoint override for S3-compatible servers
    #[builder(into)]
    pub endpoint: Option<String>,

    /// Permit plain-HTTP endpoints
    #[builder(default)]
    pub allow_http: bool,

    /// Static credentials, only for S3-compatible test servers
    #[builder(into)]
    pub access_key: Option<String>,

    #[builder(into)]
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for S3ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ClientConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Create an S3 store for `bucket` from configuration
pub fn create_s3_store(
    config: &S3ClientConfig,
    bucket: &BucketName,
) -> Result<Arc<dyn ObjectStoreBackend>, object_store::Error> {
    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(bucket.as_str())
        .with_allow_http(config.allow_http);

    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    let store = builder.build()?;

    Ok(Arc::new(store))
}
