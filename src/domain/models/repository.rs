use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// A package repository as the host package manager describes it.
///
/// Only `id`, `baseurl` and the two switches matter to bucket-backed fetching;
/// the remaining fields are carried over untouched onto the repository that
/// replaces this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct RepositoryDescriptor {
    #[builder(into)]
    pub id: String,

    #[builder(into)]
    #[serde(default)]
    pub name: Option<String>,

    /// One URL, or a list of candidate mirrors
    #[builder(default)]
    #[serde(default, deserialize_with = "one_or_many")]
    pub baseurl: Vec<String>,

    #[builder(into)]
    #[serde(default)]
    pub mirrorlist: Option<String>,

    #[builder(into)]
    #[serde(default)]
    pub basecachedir: Option<PathBuf>,

    #[builder(default)]
    #[serde(default)]
    pub gpgcheck: bool,

    #[builder(default)]
    #[serde(default, deserialize_with = "one_or_many")]
    pub gpgkey: Vec<String>,

    #[builder(into)]
    #[serde(default)]
    pub proxy: Option<String>,

    #[builder(default)]
    #[serde(default)]
    pub enablegroups: bool,

    #[serde(default)]
    pub priority: Option<u32>,

    #[builder(into)]
    #[serde(default)]
    pub base_persistdir: Option<PathBuf>,

    /// Kept in the host's own notation (`6h`, `never`, seconds)
    #[builder(into)]
    #[serde(default)]
    pub metadata_expire: Option<String>,

    #[builder(default = true)]
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Fetch this repository from its bucket instead of over HTTP
    #[builder(default)]
    #[serde(default)]
    pub s3_enabled: bool,
}

impl RepositoryDescriptor {
    pub fn settings(&self) -> RepositorySettings {
        RepositorySettings {
            name: self.name.clone(),
            mirrorlist: self.mirrorlist.clone(),
            basecachedir: self.basecachedir.clone(),
            gpgcheck: self.gpgcheck,
            gpgkey: self.gpgkey.clone(),
            proxy: self.proxy.clone(),
            enablegroups: self.enablegroups,
            priority: self.priority,
            base_persistdir: self.base_persistdir.clone(),
            metadata_expire: self.metadata_expire.clone(),
        }
    }
}

/// Host settings mirrored verbatim from the descriptor a bucket-backed
/// repository replaces. Never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositorySettings {
    pub name: Option<String>,
    pub mirrorlist: Option<String>,
    pub basecachedir: Option<PathBuf>,
    pub gpgcheck: bool,
    pub gpgkey: Vec<String>,
    pub proxy: Option<String>,
    pub enablegroups: bool,
    pub priority: Option<u32>,
    pub base_persistdir: Option<PathBuf>,
    pub metadata_expire: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let descriptor = RepositoryDescriptor::builder()
            .id("base")
            .baseurl(vec!["https://repo.s3.amazonaws.com/el9/".to_string()])
            .build();

        assert!(descriptor.enabled);
        assert!(!descriptor.s3_enabled);
        assert!(!descriptor.gpgcheck);
        assert!(descriptor.priority.is_none());
    }

    #[test]
    fn test_deserialize_single_baseurl() {
        let descriptor: RepositoryDescriptor = serde_json::from_str(
            r#"{"id": "base", "baseurl": "https://repo.s3.amazonaws.com/el9", "s3_enabled": true}"#,
        )
        .unwrap();

        assert_eq!(descriptor.baseurl, vec!["https://repo.s3.amazonaws.com/el9"]);
        assert!(descriptor.s3_enabled);
        assert!(descriptor.enabled);
    }

    #[test]
    fn test_deserialize_baseurl_list_and_gpgkey() {
        let descriptor: RepositoryDescriptor = serde_json::from_str(
            r#"{
                "id": "updates",
                "baseurl": ["https://a.s3.amazonaws.com/", "https://b.s3.amazonaws.com/"],
                "gpgkey": "file:///etc/pki/rpm-gpg/RPM-GPG-KEY",
                "gpgcheck": true,
                "priority": 10,
                "metadata_expire": "6h",
                "enabled": false
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.baseurl.len(), 2);
        assert_eq!(descriptor.gpgkey, vec!["file:///etc/pki/rpm-gpg/RPM-GPG-KEY"]);
        assert!(!descriptor.enabled);

        let settings = descriptor.settings();
        assert!(settings.gpgcheck);
        assert_eq!(settings.priority, Some(10));
        assert_eq!(settings.metadata_expire.as_deref(), Some("6h"));
    }

    #[test]
    fn test_missing_baseurl_is_empty() {
        let descriptor: RepositoryDescriptor =
            serde_json::from_str(r#"{"id": "mirrors-only", "mirrorlist": "http://m/list"}"#)
                .unwrap();
        assert!(descriptor.baseurl.is_empty());
    }
}
