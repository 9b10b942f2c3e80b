//! Release manifest and per-version metadata documents.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionManifestEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VersionManifestEntry {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionMetadata {
    pub downloads: Downloads,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Downloads {
    pub server: DownloadDescriptor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadDescriptor {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl VersionManifest {
    pub fn from_value(value: Value, url: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::network_invalid_response(url, None, format!("parse version manifest: {}", e))
        })
    }

    pub fn find(&self, id: &str) -> Option<&VersionManifestEntry> {
        self.versions.iter().find(|entry| entry.id == id)
    }
}

impl VersionMetadata {
    pub fn from_value(value: Value, url: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::network_invalid_response(url, None, format!("parse version metadata: {}", e))
                .with_hint("Releases without a server download cannot be generated")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_ignores_extra_fields() {
        let value = json!({
            "latest": { "release": "1.21.4" },
            "versions": [
                { "id": "1.21.4", "type": "release", "url": "https://meta/1.21.4.json" },
                { "id": "1.21.2", "type": "release", "url": "https://meta/1.21.2.json" }
            ]
        });

        let manifest = VersionManifest::from_value(value, "https://meta/manifest.json").unwrap();
        assert_eq!(manifest.find("1.21.2").unwrap().url, "https://meta/1.21.2.json");
        assert!(manifest.find("1.7.10").is_none());
    }

    #[test]
    fn metadata_exposes_server_download() {
        let value = json!({
            "downloads": {
                "client": { "url": "https://c", "sha1": "aa", "size": 1 },
                "server": { "url": "https://s", "sha1": "bb", "size": 42 }
            }
        });

        let meta = VersionMetadata::from_value(value, "https://meta/1.21.4.json").unwrap();
        assert_eq!(meta.downloads.server.url, "https://s");
        assert_eq!(meta.downloads.server.size, Some(42));
    }

    #[test]
    fn metadata_without_server_is_invalid_response() {
        let value = json!({ "downloads": { "client": { "url": "https://c" } } });

        let err = VersionMetadata::from_value(value, "https://meta/1.2.json").unwrap_err();
        assert_eq!(err.code.as_str(), "network.invalid_response");
    }
}
