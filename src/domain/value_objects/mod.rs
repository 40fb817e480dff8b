mod base_url;
mod bucket_name;
mod object_key;

pub use base_url::{normalize_base_url, BaseUrl};
pub use bucket_name::BucketName;
pub use object_key::ObjectKey;
