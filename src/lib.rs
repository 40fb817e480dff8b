pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - repository descriptors, value objects and errors
pub use domain::{
    BaseUrl,
    BucketName,
    DomainValidationError,
    ObjectKey,
    RepositoryDescriptor,
    RepositoryError,
    RepositorySettings,
    StorageError,
};

// Port types - interfaces for external systems
pub use ports::{BucketStore, FileGrabber, ObjectStoreClient, ObjectStream};

// Services - repository adapters and grabbers
pub use services::{
    resolve_key, ConfiguredRepository, KeyGrabber, RepositoryAdapter, RepositoryRegistry,
    SetupFailure,
};

// Application factory and configuration
pub use app::{
    create_in_memory_app, create_s3_app, App, AppBuilder, AppConfig, AppError, RepositorySource,
    StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{
    AmbientS3Client, ApacheBucketStore, InMemoryObjectStoreClient, S3ClientConfig,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, create_s3_app, AmbientS3Client, AppBuilder, BucketName, FileGrabber,
        InMemoryObjectStoreClient, KeyGrabber, ObjectStoreClient, RepositoryAdapter,
        RepositoryDescriptor, RepositoryRegistry, S3ClientConfig,
    };
}
