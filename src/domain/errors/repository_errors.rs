use super::ValidationError;

/// Errors raised while turning a repository descriptor into a bucket-backed repository.
///
/// These are fatal for the repository they concern and never for the whole set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// The descriptor cannot describe a bucket-backed repository
    #[error("Repository '{repo_id}' is misconfigured: {message}")]
    Configuration { repo_id: String, message: String },

    /// Credentials could not be resolved from the environment, or were refused
    #[error("Authentication failed for bucket '{bucket}': {message}")]
    Authentication { bucket: String, message: String },

    /// The bucket does not exist or cannot be reached
    #[error("Bucket '{bucket}' not found or inaccessible: {message}")]
    BucketNotFound { bucket: String, message: String },
}

impl RepositoryError {
    pub fn configuration(repo_id: impl Into<String>, message: impl Into<String>) -> Self {
        RepositoryError::Configuration {
            repo_id: repo_id.into(),
            message: message.into(),
        }
    }

    /// Attribute a configuration error raised below the repository layer
    pub fn for_repository(self, id: &str) -> Self {
        match self {
            RepositoryError::Configuration { repo_id, message } if repo_id.is_empty() => {
                RepositoryError::Configuration {
                    repo_id: id.to_string(),
                    message,
                }
            }
            other => other,
        }
    }

    pub fn invalid_value(repo_id: impl Into<String>, err: ValidationError) -> Self {
        RepositoryError::Configuration {
            repo_id: repo_id.into(),
            message: err.to_string(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
