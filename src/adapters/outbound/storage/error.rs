use crate::domain::{
    errors::{RepositoryError, StorageError},
    value_objects::{BucketName, ObjectKey},
};

/// Convert an object_store error raised while fetching `key`
pub fn fetch_error(err: object_store::Error, key: &ObjectKey) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
            key: key.to_string(),
        },
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => StorageError::AccessDenied {
            key: key.to_string(),
            message: err.to_string(),
        },
        _ => StorageError::Backend {
            message: format!("Failed to get object '{}': {}", key, err),
        },
    }
}

/// Convert an object_store error raised while opening `bucket`
pub fn open_error(err: object_store::Error, bucket: &BucketName) -> RepositoryError {
    match err {
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => RepositoryError::Authentication {
            bucket: bucket.to_string(),
            message: err.to_string(),
        },
        // Credential providers (environment, profile, instance metadata) report
        // their failures as generic errors
        _ if mentions_credentials(&err) => RepositoryError::Authentication {
            bucket: bucket.to_string(),
            message: err.to_string(),
        },
        _ => RepositoryError::BucketNotFound {
            bucket: bucket.to_string(),
            message: err.to_string(),
        },
    }
}

/// Convert an object_store error raised while building a client for `bucket`
pub fn build_error(err: object_store::Error, bucket: &BucketName) -> RepositoryError {
    RepositoryError::Configuration {
        repo_id: String::new(),
        message: format!("Failed to build client for bucket '{}': {}", bucket, err),
    }
}

fn mentions_credentials(err: &object_store::Error) -> bool {
    err.to_string().to_lowercase().contains("credential")
}

/// Convert object_store errors that carry their own path
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::ObjectNotFound { key: path },
            object_store::Error::PermissionDenied { path, .. }
            | object_store::Error::Unauthenticated { path, .. } => StorageError::AccessDenied {
                key: path,
                message: "permission denied".to_string(),
            },
            _ => StorageError::Backend {
                message: format!("Object store operation failed: {}", err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> BucketName {
        BucketName::new("my-repo-bucket".to_string()).unwrap()
    }

    fn boxed(message: &str) -> Box<dyn std::error::Error + Send + Sync> {
        message.to_string().into()
    }

    #[test]
    fn test_not_found_maps_to_object_not_found() {
        let key = ObjectKey::new("el9/repodata/repomd.xml".to_string()).unwrap();
        let err = object_store::Error::NotFound {
            path: key.to_string(),
            source: boxed("404"),
        };

        assert_eq!(
            fetch_error(err, &key),
            StorageError::ObjectNotFound {
                key: "el9/repodata/repomd.xml".to_string()
            }
        );
    }

    #[test]
    fn test_permission_denied_at_open_is_authentication() {
        let err = object_store::Error::PermissionDenied {
            path: String::new(),
            source: boxed("403 Forbidden"),
        };
        assert!(matches!(
            open_error(err, &bucket()),
            RepositoryError::Authentication { .. }
        ));
    }

    #[test]
    fn test_credential_failure_at_open_is_authentication() {
        let err = object_store::Error::Generic {
            store: "S3",
            source: boxed("Error getting credentials from instance metadata"),
        };
        assert!(matches!(
            open_error(err, &bucket()),
            RepositoryError::Authentication { .. }
        ));
    }

    #[test]
    fn test_other_failure_at_open_is_bucket_not_found() {
        let err = object_store::Error::Generic {
            store: "S3",
            source: boxed("NoSuchBucket"),
        };
        assert!(matches!(
            open_error(err, &bucket()),
            RepositoryError::BucketNotFound { .. }
        ));
    }

    #[test]
    fn test_network_failure_at_open_is_bucket_not_found() {
        let err = object_store::Error::Generic {
            store: "S3",
            source: boxed("error sending request: connection refused"),
        };
        let mapped = open_error(err, &bucket());

        assert!(matches!(
            mapped,
            RepositoryError::BucketNotFound { ref bucket, .. } if bucket == "my-repo-bucket"
        ));
    }
}
