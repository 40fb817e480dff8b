use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use url::Url;

use super::repository_adapter::RepositoryBinding;
use crate::{
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        value_objects::{BaseUrl, ObjectKey},
    },
    ports::{
        services::FileGrabber,
        storage::{BucketStore, ObjectStream},
    },
};

/// Path component of `url` with a single leading `/` removed.
///
/// References that do not parse as absolute URLs (`repodata/repomd.xml`) are
/// taken as bare paths with any query or fragment dropped.
pub fn resolve_key(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    match path.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

/// Fetches repository files from the bucket a repository is bound to.
///
/// URLs may be relative to the repository base URL or absolute; both resolve
/// to keys under the repository's base path.
pub struct KeyGrabber {
    binding: Arc<RepositoryBinding>,
}

impl KeyGrabber {
    pub(crate) fn new(binding: Arc<RepositoryBinding>) -> Self {
        Self { binding }
    }

    /// Grabber over a bare base URL, for use without a repository
    pub fn from_base_url(
        base_url: &str,
        bucket: Arc<dyn BucketStore>,
    ) -> Result<Self, ValidationError> {
        let base_url = BaseUrl::parse(base_url)?;
        Ok(Self::new(Arc::new(RepositoryBinding { base_url, bucket })))
    }

    pub fn base_url(&self) -> &str {
        self.binding.base_url.as_str()
    }

    /// Object key a request URL maps to
    pub fn object_key(&self, url: &str) -> String {
        let relative = Url::parse(url)
            .ok()
            .and_then(|parsed| self.binding.base_url.strip_base(&parsed).map(str::to_string))
            .unwrap_or_else(|| resolve_key(url));

        self.binding.key_path(&relative)
    }

    /// A key that cannot exist in any bucket is reported the same way as one
    /// that does not exist in this one
    fn checked_key(&self, url: &str) -> StorageResult<ObjectKey> {
        let key = self.object_key(url);
        ObjectKey::new(key.clone()).map_err(|_| StorageError::ObjectNotFound { key })
    }

    /// Download the object behind `url` to `destination`, or to the key's file
    /// name in the working directory, and return the path written.
    ///
    /// Nothing is created locally unless the object exists.
    #[instrument(skip(self), fields(bucket = %self.binding.bucket.bucket()))]
    pub async fn fetch_to_file(
        &self,
        url: &str,
        destination: Option<&Path>,
    ) -> StorageResult<PathBuf> {
        let key = self.checked_key(url)?;
        let mut reader = self.binding.bucket.get_object_stream(&key).await?;

        let destination = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(key.file_name()));

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = tokio::fs::File::create(&destination)
            .await
            .map_err(|e| StorageError::io(&destination, e))?;

        let copied = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(written) => file.flush().await.map(|_| written),
            Err(e) => Err(e),
        };
        drop(file);

        let written = match copied {
            Ok(written) => written,
            Err(e) => {
                // Leave no truncated file behind
                let _ = tokio::fs::remove_file(&destination).await;
                return Err(StorageError::io(&destination, e));
            }
        };

        debug!(%key, path = %destination.display(), bytes = written, "object written");
        Ok(destination)
    }

    /// Open the object behind `url` for streaming reads
    #[instrument(skip(self), fields(bucket = %self.binding.bucket.bucket()))]
    pub async fn open_stream(&self, url: &str) -> StorageResult<ObjectStream> {
        let key = self.checked_key(url)?;
        let stream = self.binding.bucket.get_object_stream(&key).await?;

        debug!(%key, "object opened");
        Ok(stream)
    }

    /// Read the whole object behind `url` into memory.
    ///
    /// `limit` is accepted for compatibility with other grabbers and ignored:
    /// the full object is always returned.
    #[instrument(skip(self), fields(bucket = %self.binding.bucket.bucket()))]
    pub async fn read_all(&self, url: &str, limit: Option<u64>) -> StorageResult<Bytes> {
        let key = self.checked_key(url)?;

        if let Some(limit) = limit {
            debug!(limit, "read limit ignored");
        }

        let bytes = self.binding.bucket.get_object(&key).await?;

        debug!(%key, bytes = bytes.len(), "object read");
        Ok(bytes)
    }

    /// Read the whole object behind `url` as UTF-8 text
    pub async fn read_to_string(&self, url: &str) -> StorageResult<String> {
        let bytes = self.read_all(url, None).await?;

        String::from_utf8(bytes.to_vec()).map_err(|e| StorageError::InvalidContent {
            key: self.object_key(url),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl FileGrabber for KeyGrabber {
    async fn urlgrab(&self, url: &str, filename: Option<&Path>) -> StorageResult<PathBuf> {
        self.fetch_to_file(url, filename).await
    }

    async fn urlopen(&self, url: &str) -> StorageResult<ObjectStream> {
        self.open_stream(url).await
    }

    async fn urlread(&self, url: &str, limit: Option<u64>) -> StorageResult<Bytes> {
        self.read_all(url, limit).await
    }
}

impl std::fmt::Debug for KeyGrabber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGrabber")
            .field("base_url", &self.base_url())
            .field("bucket", self.binding.bucket.bucket())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::storage::InMemoryObjectStoreClient,
        domain::value_objects::BucketName,
        ports::storage::ObjectStoreClient,
    };
    use tokio::io::AsyncReadExt;

    const BASE_URL: &str = "https://my-repo-bucket.s3.amazonaws.com/centos/7/os/x86_64/";

    async fn grabber() -> KeyGrabber {
        let client = InMemoryObjectStoreClient::new();
        let bucket = BucketName::new("my-repo-bucket".to_string()).unwrap();
        client
            .put_object(
                &bucket,
                "centos/7/os/x86_64/repodata/repomd.xml",
                "<repomd/>",
            )
            .await
            .unwrap();
        client
            .put_object(&bucket, "centos/7/os/x86_64/repodata/binary.gz", vec![0xffu8, 0xfe])
            .await
            .unwrap();

        let handle = client.open_bucket(&bucket).await.unwrap();
        KeyGrabber::from_base_url(BASE_URL, handle).unwrap()
    }

    #[test]
    fn test_resolve_key_strips_one_leading_slash() {
        assert_eq!(
            resolve_key("https://bucket.s3.amazonaws.com/repodata/repomd.xml"),
            "repodata/repomd.xml"
        );
        assert_eq!(resolve_key("/repodata/repomd.xml"), "repodata/repomd.xml");
        assert_eq!(resolve_key("repodata/repomd.xml"), "repodata/repomd.xml");
        assert_eq!(resolve_key("repodata/repomd.xml?x=1#top"), "repodata/repomd.xml");
    }

    #[test]
    fn test_resolve_key_without_path() {
        assert_eq!(resolve_key("https://bucket.s3.amazonaws.com"), "");
        assert_eq!(resolve_key(""), "");
    }

    #[tokio::test]
    async fn test_object_key_mapping() {
        let grabber = grabber().await;

        assert_eq!(
            grabber.object_key("repodata/repomd.xml"),
            "centos/7/os/x86_64/repodata/repomd.xml"
        );
        assert_eq!(
            grabber.object_key("/repodata/repomd.xml"),
            "centos/7/os/x86_64/repodata/repomd.xml"
        );
        assert_eq!(
            grabber.object_key(&format!("{}repodata/repomd.xml", BASE_URL)),
            "centos/7/os/x86_64/repodata/repomd.xml"
        );
        // Absolute URLs outside the base URL keep their whole path
        assert_eq!(
            grabber.object_key("https://mirror.example.com/repodata/repomd.xml"),
            "centos/7/os/x86_64/repodata/repomd.xml"
        );
    }

    #[tokio::test]
    async fn test_read_all_and_ignored_limit() {
        let grabber = grabber().await;

        let bytes = grabber.read_all("repodata/repomd.xml", None).await.unwrap();
        assert_eq!(bytes.as_ref(), b"<repomd/>");

        let bytes = grabber.read_all("repodata/repomd.xml", Some(2)).await.unwrap();
        assert_eq!(bytes.as_ref(), b"<repomd/>");
    }

    #[tokio::test]
    async fn test_read_to_string() {
        let grabber = grabber().await;

        assert_eq!(
            grabber.read_to_string("repodata/repomd.xml").await.unwrap(),
            "<repomd/>"
        );
        assert!(matches!(
            grabber.read_to_string("repodata/binary.gz").await,
            Err(StorageError::InvalidContent { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_stream() {
        let grabber = grabber().await;

        let mut stream = grabber.open_stream("repodata/repomd.xml").await.unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "<repomd/>");
    }

    #[tokio::test]
    async fn test_fetch_to_file_creates_parent_dirs() {
        let grabber = grabber().await;
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("cache/base/repomd.xml");

        let written = grabber
            .fetch_to_file("repodata/repomd.xml", Some(destination.as_path()))
            .await
            .unwrap();

        assert_eq!(written, destination);
        assert_eq!(std::fs::read(&written).unwrap(), b"<repomd/>");
    }

    #[tokio::test]
    async fn test_fetch_to_directory_is_io_error() {
        let grabber = grabber().await;
        let dir = tempfile::tempdir().unwrap();

        let err = grabber
            .fetch_to_file("repodata/repomd.xml", Some(dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Io { ref path, .. } if path == &dir.path().display().to_string()));
        assert!(dir.path().is_dir());
    }

    /// Bucket whose object streams fail after the first chunk
    struct BrokenStreamBucket {
        bucket: BucketName,
    }

    #[async_trait]
    impl BucketStore for BrokenStreamBucket {
        fn bucket(&self) -> &BucketName {
            &self.bucket
        }

        async fn get_object(&self, _key: &ObjectKey) -> StorageResult<Bytes> {
            Ok(Bytes::from_static(b"<repo"))
        }

        async fn get_object_stream(&self, _key: &ObjectKey) -> StorageResult<ObjectStream> {
            let chunks = futures::stream::iter(vec![
                Ok(Bytes::from_static(b"<repo")),
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset",
                )),
            ]);
            Ok(Box::new(tokio_util::io::StreamReader::new(chunks)))
        }
    }

    #[tokio::test]
    async fn test_interrupted_download_leaves_no_file() {
        let bucket = Arc::new(BrokenStreamBucket {
            bucket: BucketName::new("my-repo-bucket".to_string()).unwrap(),
        });
        let grabber = KeyGrabber::from_base_url(BASE_URL, bucket).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("repomd.xml");

        let err = grabber
            .fetch_to_file("repodata/repomd.xml", Some(destination.as_path()))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_empty_key_is_not_found() {
        let client = InMemoryObjectStoreClient::new();
        let bucket = BucketName::new("root-bucket".to_string()).unwrap();
        client.create_bucket(&bucket).await;
        let handle = client.open_bucket(&bucket).await.unwrap();
        let grabber = KeyGrabber::from_base_url("https://root-bucket.s3.amazonaws.com", handle)
            .unwrap();

        let err = grabber.read_all("https://root-bucket.s3.amazonaws.com", None).await;
        assert_eq!(err, Err(StorageError::ObjectNotFound { key: String::new() }));
    }

    #[tokio::test]
    async fn test_file_grabber_contract() {
        let grabber = grabber().await;
        let contract: &dyn FileGrabber = &grabber;

        let bytes = contract.urlread("repodata/repomd.xml", None).await.unwrap();
        assert_eq!(bytes.as_ref(), b"<repomd/>");

        let missing = contract.urlread("repodata/primary.xml.gz", None).await;
        assert!(missing.unwrap_err().is_not_found());
    }
}
