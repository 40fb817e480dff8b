mod key_grabber;
mod repository_adapter;
mod repository_registry;

pub use key_grabber::{resolve_key, KeyGrabber};
pub use repository_adapter::RepositoryAdapter;
pub use repository_registry::{ConfiguredRepository, RepositoryRegistry, SetupFailure};
