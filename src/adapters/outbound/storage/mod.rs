// Infrastructure error conversions
pub mod error;

// Storage implementations
pub mod apache_object_store_adapter;
pub mod memory;

// Provider-specific implementations
pub mod s3;

// Re-export key types
pub use apache_object_store_adapter::ApacheBucketStore;
pub use memory::InMemoryObjectStoreClient;
pub use s3::{AmbientS3Client, S3ClientConfig};
