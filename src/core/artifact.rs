//! Local cache of release server artifacts.
//!
//! The cache directory is append-only: once `<version>.jar` exists it is
//! trusted and never refetched. A failed or short download never leaves a file
//! at that path.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::manifest::{VersionManifest, VersionManifestEntry, VersionMetadata};
use crate::utils::io;
use crate::version::SupportedVersion;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub version: SupportedVersion,
    pub path: PathBuf,
    pub file_name: String,
    pub exists: bool,
}

pub struct ArtifactCache<'a> {
    dir: PathBuf,
    manifest_url: String,
    transport: &'a dyn Transport,
}

impl<'a> ArtifactCache<'a> {
    pub fn new(dir: impl Into<PathBuf>, manifest_url: impl Into<String>, transport: &'a dyn Transport) -> Self {
        Self {
            dir: dir.into(),
            manifest_url: manifest_url.into(),
            transport,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Expected location of a version's artifact. Existence is checked on every call.
    pub fn record(&self, version: &SupportedVersion) -> ArtifactRecord {
        let file_name = version.artifact_file_name();
        let path = self.dir.join(&file_name);
        let exists = path.is_file();
        ArtifactRecord {
            version: version.clone(),
            path,
            file_name,
            exists,
        }
    }

    /// Ensure every requested version has a local artifact.
    ///
    /// Performs no network access when all artifacts are already cached.
    /// Otherwise the manifest is fetched once and missing artifacts are
    /// downloaded concurrently; any failure aborts the whole batch.
    pub fn resolve(&self, versions: &[SupportedVersion]) -> Result<Vec<ArtifactRecord>> {
        io::ensure_dir(&self.dir, "create artifact cache")?;

        let mut records: Vec<ArtifactRecord> = versions.iter().map(|v| self.record(v)).collect();
        if records.iter().all(|r| r.exists) {
            return Ok(records);
        }

        log_status!("artifact", "Fetching version manifest from {}", self.manifest_url);
        let manifest = VersionManifest::from_value(
            self.transport.get_json(&self.manifest_url)?,
            &self.manifest_url,
        )?;

        let mut pending: Vec<(&mut ArtifactRecord, VersionManifestEntry)> = Vec::new();
        let mut unknown = Vec::new();
        for record in records.iter_mut().filter(|r| !r.exists) {
            match manifest.find(record.version.id()) {
                Some(entry) => {
                    let entry = entry.clone();
                    pending.push((record, entry));
                }
                None => unknown.push(record.version.id().to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(Error::manifest_version_not_found(unknown, self.manifest_url.clone()));
        }

        let transport = self.transport;
        let results: Vec<Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = pending
                .iter()
                .map(|(record, entry)| {
                    let path = record.path.as_path();
                    let version = &record.version;
                    scope.spawn(move || download_artifact(transport, version, entry, path))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::internal_unexpected("Artifact download thread panicked"))
                    })
                })
                .collect()
        });

        for result in results {
            result?;
        }
        for (record, _) in pending {
            record.exists = true;
        }

        Ok(records)
    }
}

fn download_artifact(
    transport: &dyn Transport,
    version: &SupportedVersion,
    entry: &VersionManifestEntry,
    dest: &Path,
) -> Result<()> {
    let metadata = VersionMetadata::from_value(transport.get_json(&entry.url)?, &entry.url)?;
    let server = metadata.downloads.server;

    log_status!("artifact", "Downloading {} from {}", version, server.url);
    let written = match transport.download(&server.url, dest) {
        Ok(written) => written,
        Err(err) => {
            discard_partial(dest);
            return Err(err);
        }
    };

    if let Some(expected) = server.size {
        if written != expected {
            discard_partial(dest);
            return Err(Error::network_invalid_response(
                &server.url,
                None,
                format!("expected {} bytes, received {}", expected, written),
            ));
        }
    }

    log_status!("artifact", "Saved {} ({} bytes) to {}", version, written, dest.display());
    Ok(())
}

fn discard_partial(dest: &Path) {
    if let Err(e) = fs::remove_file(dest) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log_status!("artifact", "Could not remove partial {}: {}", dest.display(), e);
        }
    }
}
