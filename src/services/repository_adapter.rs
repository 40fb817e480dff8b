use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};

use super::key_grabber::KeyGrabber;
use crate::{
    domain::{
        errors::{RepositoryError, RepositoryResult},
        models::{RepositoryDescriptor, RepositorySettings},
        value_objects::{BaseUrl, BucketName},
    },
    ports::storage::{BucketStore, ObjectStoreClient},
};

/// Base URL and bucket handle shared between a repository and its grabber
pub(crate) struct RepositoryBinding {
    pub(crate) base_url: BaseUrl,
    pub(crate) bucket: Arc<dyn BucketStore>,
}

impl RepositoryBinding {
    pub(crate) fn key_path(&self, relative_key: &str) -> String {
        format!("{}{}", self.base_url.key_prefix(), relative_key)
    }
}

/// A package repository served from an object-store bucket.
///
/// The bucket is opened once, when the repository is connected, and every
/// fetch made through [`RepositoryAdapter::grabber`] reuses that handle.
pub struct RepositoryAdapter {
    id: String,
    binding: Arc<RepositoryBinding>,
    settings: RepositorySettings,
    grabber: OnceLock<KeyGrabber>,
}

impl RepositoryAdapter {
    /// Connect repository `id` to the bucket named by its base URL.
    ///
    /// Exactly one base URL is accepted; mirror lists are rejected rather
    /// than narrowed to their first entry.
    #[instrument(skip(base_urls, client))]
    pub async fn connect<S: AsRef<str>>(
        id: &str,
        base_urls: &[S],
        client: &dyn ObjectStoreClient,
    ) -> RepositoryResult<Self> {
        let base_url = match base_urls {
            [single] => single.as_ref(),
            _ => {
                return Err(RepositoryError::configuration(
                    id,
                    format!(
                        "repository must have exactly one 'baseurl' value, found {}",
                        base_urls.len()
                    ),
                ))
            }
        };

        let base_url =
            BaseUrl::parse(base_url).map_err(|e| RepositoryError::invalid_value(id, e))?;
        let bucket_name = BucketName::from_host(base_url.host())
            .map_err(|e| RepositoryError::invalid_value(id, e))?;

        let bucket = client
            .open_bucket(&bucket_name)
            .await
            .map_err(|e| e.for_repository(id))?;

        info!(
            bucket = %bucket_name,
            prefix = base_url.key_prefix(),
            "connected bucket-backed repository"
        );

        Ok(Self {
            id: id.to_string(),
            binding: Arc::new(RepositoryBinding { base_url, bucket }),
            settings: RepositorySettings::default(),
            grabber: OnceLock::new(),
        })
    }

    /// Connect the repository a host descriptor describes, carrying its
    /// settings over
    pub async fn from_descriptor(
        descriptor: &RepositoryDescriptor,
        client: &dyn ObjectStoreClient,
    ) -> RepositoryResult<Self> {
        let mut adapter = Self::connect(&descriptor.id, &descriptor.baseurl, client).await?;
        adapter.settings = descriptor.settings();
        Ok(adapter)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bucket_name(&self) -> &BucketName {
        self.binding.bucket.bucket()
    }

    /// The bucket handle opened at connect time
    pub fn bucket_handle(&self) -> &Arc<dyn BucketStore> {
        debug!(repo = %self.id, bucket = %self.bucket_name(), "bucket handle requested");
        &self.binding.bucket
    }

    /// Normalized base URL, always ending with `/`
    pub fn base_url(&self) -> &str {
        self.binding.base_url.as_str()
    }

    /// Key prefix every object of this repository lives under
    pub fn base_path(&self) -> &str {
        self.binding.base_url.key_prefix()
    }

    /// Full object key for a key relative to the repository root
    pub fn key_path(&self, relative_key: &str) -> String {
        self.binding.key_path(relative_key)
    }

    /// The repository's grabber, created on first use
    pub fn grabber(&self) -> &KeyGrabber {
        self.grabber.get_or_init(|| {
            debug!(repo = %self.id, "creating grabber");
            KeyGrabber::new(self.binding.clone())
        })
    }

    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }
}

impl std::fmt::Debug for RepositoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryAdapter")
            .field("id", &self.id)
            .field("base_url", &self.base_url())
            .field("bucket", &self.bucket_name())
            .finish_non_exhaustive()
    }
}
