//! The indexer HTTP API client.

use std::sync::Arc;

use alloy::primitives::{Address, hex};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::{Nft, RawContract};

/// Errors that can occur while querying the indexer.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The configured base URL cannot take path segments.
    #[error("Indexer base URL cannot be a base: {0}")]
    BadBaseUrl(Url),
    /// The HTTP request failed after retries.
    #[error("Indexer request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    /// The response body was not the expected JSON shape.
    #[error("Indexer returned an unexpected payload: {0}")]
    Payload(#[from] reqwest::Error),
}

/// A source of contract records and NFT records, normally the indexer API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContractDataSource: Send + Sync {
    /// Fetches the full record for one contract, `None` when the indexer has
    /// no row for it.
    async fn fetch_contract(&self, address: Address) -> Result<Option<RawContract>, IndexerError>;

    /// Fetches NFT records for a contract, optionally narrowed to a single
    /// token id.
    async fn fetch_nfts(
        &self,
        address: Address,
        token_id: Option<String>,
    ) -> Result<Vec<Nft>, IndexerError>;
}

#[derive(Debug, Deserialize)]
struct ContractResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    results: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
struct NftResponse {
    #[serde(default)]
    results: Vec<Nft>,
}

/// `ContractDataSource` backed by the indexer HTTP API.
pub struct HttpIndexerClient {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
}

impl HttpIndexerClient {
    /// Creates a new client for the indexer at `base_url`.
    pub fn new(base_url: Url, client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, client }
    }

    fn contract_url(&self, address: Address, tail: Option<&str>) -> Result<Url, IndexerError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| IndexerError::BadBaseUrl(self.base_url.clone()))?;
            segments.pop_if_empty().push("contract").push(&hex::encode_prefixed(address));
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ContractDataSource for HttpIndexerClient {
    async fn fetch_contract(&self, address: Address) -> Result<Option<RawContract>, IndexerError> {
        let mut url = self.contract_url(address, None)?;
        url.query_pairs_mut().append_pair("full", "true").append_pair("includeAbi", "true");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(
                %address,
                status = %response.status(),
                "Indexer has no record for contract."
            );
            return Ok(None);
        }

        let mut payload: ContractResponse = response.json().await?;
        if payload.success && !payload.results.is_empty() {
            Ok(Some(payload.results.remove(0)))
        } else {
            Ok(None)
        }
    }

    async fn fetch_nfts(
        &self,
        address: Address,
        token_id: Option<String>,
    ) -> Result<Vec<Nft>, IndexerError> {
        let mut url = self.contract_url(address, Some("nfts"))?;
        if let Some(token_id) = token_id {
            url.query_pairs_mut().append_pair("tokenId", &token_id);
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(
                %address,
                status = %response.status(),
                "Indexer has no NFT records for contract."
            );
            return Ok(Vec::new());
        }

        let payload: NftResponse = response.json().await?;
        Ok(payload.results)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use mockito::Matcher;

    use super::*;
    use crate::test_helpers::create_test_http_client;

    fn client_for(server: &mockito::Server) -> HttpIndexerClient {
        HttpIndexerClient::new(Url::parse(&server.url()).unwrap(), create_test_http_client())
    }

    #[tokio::test]
    async fn test_fetch_contract_hit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/contract/0x2222222222222222222222222222222222222222",
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("full".into(), "true".into()),
                Matcher::UrlEncoded("includeAbi".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"success": true, "results": [
                    {"address": "0x2222222222222222222222222222222222222222", "name": "Example"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let raw = client
            .fetch_contract(address!("2222222222222222222222222222222222222222"))
            .await
            .unwrap();

        assert_eq!(raw.unwrap().name.as_deref(), Some("Example"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_contract_not_found_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let raw = client
            .fetch_contract(address!("2222222222222222222222222222222222222222"))
            .await
            .unwrap();
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn test_fetch_contract_unsuccessful_envelope_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success": false, "results": []}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let raw = client
            .fetch_contract(address!("2222222222222222222222222222222222222222"))
            .await
            .unwrap();
        assert!(raw.is_none());
    }

    #[tokio::test]
    async fn test_fetch_nfts_with_token_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "GET",
                "/contract/0x2222222222222222222222222222222222222222/nfts",
            )
            .match_query(Matcher::UrlEncoded("tokenId".into(), "42".into()))
            .with_status(200)
            .with_body(r#"{"results": [{"tokenId": "42", "tokenUri": "ipfs://x/42.json"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let nfts = client
            .fetch_nfts(
                address!("2222222222222222222222222222222222222222"),
                Some("42".into()),
            )
            .await
            .unwrap();

        assert_eq!(nfts.len(), 1);
        assert_eq!(nfts[0].id, "42");
        mock.assert_async().await;
    }
}
