pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::FileGrabber;
pub use storage::{BucketStore, ObjectStoreClient, ObjectStream};
