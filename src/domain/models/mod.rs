pub mod repository;

pub use repository::{RepositoryDescriptor, RepositorySettings};
