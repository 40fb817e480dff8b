use tracing::{debug, info, warn};

use super::repository_adapter::RepositoryAdapter;
use crate::{
    domain::{errors::RepositoryError, models::RepositoryDescriptor},
    ports::storage::ObjectStoreClient,
};

/// A repository as it stands after setup
#[derive(Debug)]
pub enum ConfiguredRepository {
    /// Left to the host's own fetching
    Plain(RepositoryDescriptor),
    /// Served from its bucket
    Bucket(RepositoryAdapter),
}

impl ConfiguredRepository {
    pub fn id(&self) -> &str {
        match self {
            ConfiguredRepository::Plain(descriptor) => &descriptor.id,
            ConfiguredRepository::Bucket(adapter) => adapter.id(),
        }
    }

    pub fn as_adapter(&self) -> Option<&RepositoryAdapter> {
        match self {
            ConfiguredRepository::Bucket(adapter) => Some(adapter),
            ConfiguredRepository::Plain(_) => None,
        }
    }
}

/// A bucket-backed repository that could not be set up
#[derive(Debug, Clone, PartialEq)]
pub struct SetupFailure {
    pub repo_id: String,
    pub error: RepositoryError,
}

/// The session's enabled repositories, in configuration order
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    repositories: Vec<ConfiguredRepository>,
}

impl RepositoryRegistry {
    /// Register every enabled descriptor, swapping the bucket-enabled ones for
    /// connected [`RepositoryAdapter`]s.
    ///
    /// A repository that fails to connect is reported and left out; the
    /// others are still registered.
    pub async fn setup(
        descriptors: impl IntoIterator<Item = RepositoryDescriptor>,
        client: &dyn ObjectStoreClient,
    ) -> (Self, Vec<SetupFailure>) {
        let mut registry = Self::default();
        let mut failures = Vec::new();

        for descriptor in descriptors {
            if !descriptor.enabled {
                debug!(repo = %descriptor.id, "skipping disabled repository");
                continue;
            }

            if !descriptor.s3_enabled {
                registry.insert(ConfiguredRepository::Plain(descriptor));
                continue;
            }

            match RepositoryAdapter::from_descriptor(&descriptor, client).await {
                Ok(adapter) => {
                    info!(repo = %descriptor.id, base_url = adapter.base_url(), "repository served from bucket");
                    registry.insert(ConfiguredRepository::Bucket(adapter));
                }
                Err(error) => {
                    warn!(repo = %descriptor.id, %error, "bucket-backed repository setup failed");
                    failures.push(SetupFailure {
                        repo_id: descriptor.id,
                        error,
                    });
                }
            }
        }

        (registry, failures)
    }

    /// Add a repository, replacing any earlier one with the same id
    pub fn insert(&mut self, repository: ConfiguredRepository) {
        self.repositories.retain(|existing| existing.id() != repository.id());
        self.repositories.push(repository);
    }

    pub fn get(&self, id: &str) -> Option<&ConfiguredRepository> {
        self.repositories.iter().find(|repository| repository.id() == id)
    }

    pub fn adapter(&self, id: &str) -> Option<&RepositoryAdapter> {
        self.get(id).and_then(ConfiguredRepository::as_adapter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfiguredRepository> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
