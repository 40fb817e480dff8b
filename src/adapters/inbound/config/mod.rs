pub mod repository_file;

pub use repository_file::{load_repository_file, parse_repositories, RepositoryFileError};
