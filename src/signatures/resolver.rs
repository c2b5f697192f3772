//! Remote signature lookup against the public signature database.
//!
//! Queried only on registry miss. A missing or empty `text_signature` is a
//! miss, not an error; the caller decides how to degrade.

use std::sync::Arc;

use alloy::primitives::{B256, Selector, hex};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors that can occur while querying the signature service.
#[derive(Debug, Error)]
pub enum SignatureSourceError {
    /// The configured base URL cannot take path segments.
    #[error("Signature service base URL cannot be a base: {0}")]
    BadBaseUrl(Url),
    /// The HTTP request failed after retries.
    #[error("Signature service request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    /// The response body was not the expected JSON shape.
    #[error("Signature service returned an unexpected payload: {0}")]
    Payload(#[from] reqwest::Error),
}

/// A source of function/event signature text for unknown hashes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SignatureSource: Send + Sync {
    /// Resolves a 4-byte function selector to its signature text.
    async fn function_signature(
        &self,
        selector: Selector,
    ) -> Result<Option<String>, SignatureSourceError>;

    /// Resolves an event topic hash to its signature text.
    async fn event_signature(&self, topic: B256) -> Result<Option<String>, SignatureSourceError>;
}

#[derive(Debug, Deserialize)]
struct SignatureResponse {
    #[serde(default)]
    text_signature: Option<String>,
}

/// `SignatureSource` backed by the public signature-lookup HTTP service
/// (`GET get_abi_signature?type=function|event&hex=...`).
pub struct HttpSignatureSource {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
}

impl HttpSignatureSource {
    /// Creates a new client for the service at `base_url`.
    pub fn new(base_url: Url, client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, client }
    }

    async fn lookup(
        &self,
        kind: &str,
        hex_id: &str,
    ) -> Result<Option<String>, SignatureSourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SignatureSourceError::BadBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("get_abi_signature");
        url.query_pairs_mut().append_pair("type", kind).append_pair("hex", hex_id);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                kind,
                hex = hex_id,
                "Signature service returned an error status."
            );
            return Ok(None);
        }

        let payload: SignatureResponse = response.json().await?;
        Ok(payload.text_signature.filter(|signature| !signature.is_empty()))
    }
}

#[async_trait]
impl SignatureSource for HttpSignatureSource {
    async fn function_signature(
        &self,
        selector: Selector,
    ) -> Result<Option<String>, SignatureSourceError> {
        self.lookup("function", &hex::encode_prefixed(selector)).await
    }

    async fn event_signature(&self, topic: B256) -> Result<Option<String>, SignatureSourceError> {
        self.lookup("event", &hex::encode_prefixed(topic)).await
    }
}
