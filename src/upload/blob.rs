// Azure Blob Storage upload (SAS token auth)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::StorageConfig;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Somewhere uploaded documents are stored
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `body` under `blob_name` and return its public URL (without
    /// credentials).
    async fn put(&self, blob_name: &str, body: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Blob name for an upload: `{timestamp_ms}-{file_name}`
pub fn blob_name(file_name: &str, timestamp_ms: i64) -> String {
    format!("{}-{}", timestamp_ms, file_name)
}

/// Block blob uploads into one container
#[derive(Clone)]
pub struct AzureBlobStore {
    client: Client,
    storage_url: String,
    container: String,
    sas_token: String,
}

impl AzureBlobStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            storage_url: config.url.clone(),
            container: config.container.clone(),
            sas_token: config.sas_token.clone(),
        })
    }

    /// `{storage_url}{container}/{blob_name}{sas_token}`
    ///
    /// The pieces are concatenated verbatim, so the storage URL carries its
    /// trailing slash and the SAS token its leading `?`.
    pub fn signed_url(&self, blob_name: &str) -> String {
        format!(
            "{}{}/{}{}",
            self.storage_url, self.container, blob_name, self.sas_token
        )
    }
}

/// Drop the query string (the SAS credentials) from a signed URL
pub fn strip_credentials(signed_url: &str) -> &str {
    signed_url.split('?').next().unwrap_or(signed_url)
}

#[async_trait]
impl DocumentStore for AzureBlobStore {
    async fn put(&self, blob_name: &str, body: Vec<u8>, content_type: &str) -> Result<String> {
        let url = self.signed_url(blob_name);
        tracing::debug!(blob = blob_name, bytes = body.len(), "Uploading blob");

        let response = self
            .client
            .put(&url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .context("Failed to send upload to Blob Storage")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Blob Storage upload failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        Ok(strip_credentials(&url).to_string())
    }
}
