//! Blocking HTTP transport for manifest lookups and artifact downloads.

use reqwest::blocking::{Client, Response};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Remote access used by the artifact cache.
///
/// Implementations must be shareable across download threads.
pub trait Transport: Send + Sync {
    /// Fetch and parse a JSON document.
    fn get_json(&self, url: &str) -> Result<Value>;

    /// Stream the body at `url` into `dest`, returning the bytes written.
    ///
    /// `dest` should only appear once the body has been received in full.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("registry-datagen/{}", VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

        Ok(Self { client })
    }

    fn send(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::network_request_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network_invalid_response(
                url,
                Some(status.as_u16()),
                format!("HTTP {}", status),
            ));
        }

        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.send(url)?
            .json()
            .map_err(|e| Error::network_invalid_response(url, None, e.to_string()))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.send(url)?;
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create temp file in {}", dir.display())))
        })?;

        let written = response
            .copy_to(file.as_file_mut())
            .map_err(|e| Error::network_request_failed(url, e.to_string()))?;

        file.persist(dest).map_err(|e| {
            Error::internal_io(e.error.to_string(), Some(format!("persist {}", dest.display())))
        })?;

        Ok(written)
    }
}
