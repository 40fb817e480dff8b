use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    adapters::{
        inbound::config::{load_repository_file, RepositoryFileError},
        outbound::storage::{AmbientS3Client, InMemoryObjectStoreClient, S3ClientConfig},
    },
    domain::models::RepositoryDescriptor,
    ports::storage::ObjectStoreClient,
    services::{RepositoryRegistry, SetupFailure},
};

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub repository_source: RepositorySource,
}

/// Object-store backend configuration
#[derive(Clone)]
pub enum StorageBackend {
    /// AWS S3 with credentials from the execution environment
    S3(S3ClientConfig),
    /// Buckets held in memory, shared with whoever seeded the client
    InMemory(InMemoryObjectStoreClient),
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::S3(S3ClientConfig::default())
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::S3(config) => f.debug_tuple("S3").field(config).finish(),
            StorageBackend::InMemory(_) => f.write_str("InMemory"),
        }
    }
}

/// Where the host's repository descriptors come from
#[derive(Debug, Clone, Default)]
pub enum RepositorySource {
    #[default]
    None,
    File(PathBuf),
    Descriptors(Vec<RepositoryDescriptor>),
}

/// The assembled session: client, registered repositories and the
/// repositories that failed to set up
pub struct App {
    pub client: Arc<dyn ObjectStoreClient>,
    pub registry: RepositoryRegistry,
    pub failures: Vec<SetupFailure>,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Read descriptors from a repository file at build time
    pub fn with_repository_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.repository_source = RepositorySource::File(path.into());
        self
    }

    /// Use descriptors supplied by the caller
    pub fn with_repositories(mut self, descriptors: Vec<RepositoryDescriptor>) -> Self {
        self.config.repository_source = RepositorySource::Descriptors(descriptors);
        self
    }

    /// Build the object-store client for the configured backend
    pub fn build_client(&self) -> Arc<dyn ObjectStoreClient> {
        match &self.config.storage_backend {
            StorageBackend::S3(config) => Arc::new(AmbientS3Client::new(config.clone())),
            StorageBackend::InMemory(client) => Arc::new(client.clone()),
        }
    }

    /// Build the client and set up every configured repository
    pub async fn build(self) -> Result<App, AppError> {
        let client = self.build_client();

        let descriptors = match self.config.repository_source {
            RepositorySource::None => Vec::new(),
            RepositorySource::File(path) => load_repository_file(&path).await?,
            RepositorySource::Descriptors(descriptors) => descriptors,
        };

        let (registry, failures) = RepositoryRegistry::setup(descriptors, client.as_ref()).await;

        Ok(App {
            client,
            registry,
            failures,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    RepositoryFile(#[from] RepositoryFileError),
}

/// Convenience functions for common configurations
///
/// Create an S3-backed application with ambient credentials
pub async fn create_s3_app(
    config: S3ClientConfig,
    repository_file: impl Into<PathBuf>,
) -> Result<App, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3(config))
        .with_repository_file(repository_file)
        .build()
        .await
}

/// Create an application over an in-memory client, for tests and demos
pub async fn create_in_memory_app(
    client: InMemoryObjectStoreClient,
    descriptors: Vec<RepositoryDescriptor>,
) -> Result<App, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory(client))
        .with_repositories(descriptors)
        .build()
        .await
}
