/// Errors raised by a single fetch against a bucket
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The resolved key does not exist in the bucket
    ObjectNotFound { key: String },

    /// The bucket refused access to the key
    AccessDenied { key: String, message: String },

    /// Writing the fetched object to the local filesystem failed
    Io { path: String, message: String },

    /// Object content could not be decoded as requested
    InvalidContent { key: String, message: String },

    /// Any other failure reported by the object store backend
    Backend { message: String },
}

impl StorageError {
    /// Wrap a local filesystem failure on `path`
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound { .. })
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::AccessDenied { key, message } => {
                write!(f, "Access denied for object '{}': {}", key, message)
            }
            StorageError::Io { path, message } => {
                write!(f, "IO error writing '{}': {}", path, message)
            }
            StorageError::InvalidContent { key, message } => {
                write!(f, "Invalid content in object '{}': {}", key, message)
            }
            StorageError::Backend { message } => {
                write!(f, "Storage backend error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
