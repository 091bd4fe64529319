// ============================================================
// Layer 6 — HTTP Archive Source
// ============================================================
// Blocking GET of a whole archive into memory with reqwest.
// No timeout and no retry: the call blocks until the body is
// complete or the connection fails. A non-success status is an
// error rather than a body to unpack.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::domain::traits::ArchiveSource;

pub struct HttpArchiveSource {
    client: Client,
}

impl HttpArchiveSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Cannot build HTTP client")?;
        Ok(Self { client })
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!("Downloading '{}'", url);

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to '{url}' failed"))?
            .error_for_status()
            .with_context(|| format!("Server refused '{url}'"))?;

        let bytes = response
            .bytes()
            .with_context(|| format!("Cannot read response body of '{url}'"))?;

        tracing::info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
