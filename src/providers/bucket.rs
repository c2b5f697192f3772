//! The verified-contract object store client.
//!
//! Objects are keyed by checksummed address. A missing object is the
//! expected unverified case, never an error.

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Name of the per-contract metadata object.
pub const METADATA_FILENAME: &str = "metadata.json";
/// Name of the per-contract source object.
pub const SOURCE_FILENAME: &str = "source.json";

/// Errors that can occur while querying the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured base URL cannot take path segments.
    #[error("Object store base URL cannot be a base: {0}")]
    BadBaseUrl(Url),
    /// The HTTP request failed after retries.
    #[error("Object store request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    /// The response body could not be read.
    #[error("Object store returned an unreadable body: {0}")]
    Body(#[from] reqwest::Error),
}

/// Read access to the verified-contract object store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VerifiedContractStore: Send + Sync {
    /// Fetches and decodes `metadata.json` (ABI and constructor properties)
    /// for a contract; `None` when the contract is unverified.
    async fn fetch_metadata(&self, address: Address) -> Result<Option<Value>, StoreError>;

    /// Fetches `source.json` for a contract; `None` when the contract is
    /// unverified.
    async fn fetch_source(&self, address: Address) -> Result<Option<Value>, StoreError>;

    /// Existence probe for the metadata object.
    async fn is_verified(&self, address: Address) -> Result<bool, StoreError>;
}

/// The metadata object wraps its payload in a JSON-encoded `content` field.
#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    content: Option<String>,
}

/// `VerifiedContractStore` backed by a public HTTP bucket.
pub struct HttpVerifiedContractStore {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
}

impl HttpVerifiedContractStore {
    /// Creates a new client for the store at `base_url`.
    pub fn new(base_url: Url, client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, client }
    }

    fn object_url(&self, address: Address, filename: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::BadBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&address.to_checksum(None))
            .push(filename);
        Ok(url)
    }
}

#[async_trait]
impl VerifiedContractStore for HttpVerifiedContractStore {
    async fn fetch_metadata(&self, address: Address) -> Result<Option<Value>, StoreError> {
        let url = self.object_url(address, METADATA_FILENAME)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            // Expected for unverified contracts.
            return Ok(None);
        }

        let envelope: MetadataEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(%address, error = %e, "Verified-contract metadata is not JSON.");
                return Ok(None);
            }
        };
        let Some(content) = envelope.content else {
            return Ok(None);
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    %address,
                    error = %e,
                    "Verified-contract metadata content is malformed."
                );
                Ok(None)
            }
        }
    }

    async fn fetch_source(&self, address: Address) -> Result<Option<Value>, StoreError> {
        let url = self.object_url(address, SOURCE_FILENAME)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        match response.json().await {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(%address, error = %e, "Verified-contract source is malformed.");
                Ok(None)
            }
        }
    }

    async fn is_verified(&self, address: Address) -> Result<bool, StoreError> {
        let url = self.object_url(address, METADATA_FILENAME)?;
        let response = self.client.head(url).send().await?;
        Ok(response.status().is_success())
    }
}
