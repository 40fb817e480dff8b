use url::Url;

use crate::domain::errors::ValidationError;

/// Append the trailing `/` a base URL needs so that relative paths resolve
/// underneath it instead of replacing its last segment.
pub fn normalize_base_url(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    }
}

/// The root address of a bucket-backed repository.
///
/// Always ends with `/`. The host's first label names the bucket and the
/// path names the key prefix every object of the repository lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    raw: String,
    url: Url,
    key_prefix: String,
}

impl BaseUrl {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let raw = normalize_base_url(value.trim());

        let url = Url::parse(&raw).map_err(|e| ValidationError::InvalidBaseUrl {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ValidationError::BaseUrlHasQuery(value.to_string()));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::BaseUrlMissingHost(value.to_string()));
        }

        let key_prefix = url.path().trim_start_matches('/').to_string();

        Ok(Self {
            raw,
            url,
            key_prefix,
        })
    }

    /// The normalized URL string, exactly as configured plus the trailing `/`
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Relative key prefix derived from the URL path: no leading `/`, a
    /// trailing `/`, or empty when the repository sits at the bucket root.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// If `url` points at or below this base URL, return the part of its path
    /// that follows the base path.
    pub fn strip_base<'a>(&self, url: &'a Url) -> Option<&'a str> {
        if url.host_str() != self.url.host_str() {
            return None;
        }
        url.path().strip_prefix(self.url.path())
    }
}

impl std::fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_missing_slash() {
        assert_eq!(
            normalize_base_url("https://repo.s3.amazonaws.com/centos/7"),
            "https://repo.s3.amazonaws.com/centos/7/"
        );
        let once = normalize_base_url("https://repo.s3.amazonaws.com/centos/7");
        assert_eq!(normalize_base_url(&once), once);
    }

    #[test]
    fn test_parse_derives_key_prefix() {
        let base = BaseUrl::parse("https://my-repo-bucket.s3.amazonaws.com/centos/7/os/x86_64")
            .unwrap();
        assert_eq!(
            base.as_str(),
            "https://my-repo-bucket.s3.amazonaws.com/centos/7/os/x86_64/"
        );
        assert_eq!(base.host(), "my-repo-bucket.s3.amazonaws.com");
        assert_eq!(base.key_prefix(), "centos/7/os/x86_64/");
    }

    #[test]
    fn test_bucket_root_has_empty_prefix() {
        let base = BaseUrl::parse("https://my-repo-bucket.s3.amazonaws.com").unwrap();
        assert_eq!(base.as_str(), "https://my-repo-bucket.s3.amazonaws.com/");
        assert_eq!(base.key_prefix(), "");
    }

    #[test]
    fn test_s3_scheme_is_accepted() {
        let base = BaseUrl::parse("s3://packages/el9/").unwrap();
        assert_eq!(base.host(), "packages");
        assert_eq!(base.key_prefix(), "el9/");
    }

    #[test]
    fn test_invalid_base_urls() {
        assert!(matches!(
            BaseUrl::parse("not a url"),
            Err(ValidationError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            BaseUrl::parse("file:///srv/repo"),
            Err(ValidationError::BaseUrlMissingHost(_))
        ));
        assert!(matches!(
            BaseUrl::parse("https://repo.s3.amazonaws.com/el9?versionId=3"),
            Err(ValidationError::BaseUrlHasQuery(_))
        ));
    }

    #[test]
    fn test_strip_base() {
        let base = BaseUrl::parse("https://repo.s3.amazonaws.com/el9/").unwrap();

        let inside = Url::parse("https://repo.s3.amazonaws.com/el9/repodata/repomd.xml").unwrap();
        assert_eq!(base.strip_base(&inside), Some("repodata/repomd.xml"));

        let other_host = Url::parse("https://mirror.example.com/el9/repodata/repomd.xml").unwrap();
        assert_eq!(base.strip_base(&other_host), None);

        let outside = Url::parse("https://repo.s3.amazonaws.com/el8/repodata/repomd.xml").unwrap();
        assert_eq!(base.strip_base(&outside), None);
    }
}
