//! Fetchers for the public token-list and system-contract-list documents.
//!
//! Both documents are address-agnostic and cover several chains; entries are
//! filtered down to the configured chain id after fetch.

use std::sync::Arc;

use alloy::primitives::Address;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching a list document.
#[derive(Debug, Error)]
pub enum ListDocumentError {
    /// The HTTP request failed after retries.
    #[error("List document request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    /// The document was served with an error status.
    #[error("List document request returned status {0}")]
    Status(reqwest::StatusCode),
    /// The document body was not the expected JSON shape.
    #[error("List document payload is malformed: {0}")]
    Payload(#[from] reqwest::Error),
}

/// One token entry of the token-list document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// The chain this entry belongs to.
    #[serde(default)]
    pub chain_id: u64,
    /// The token contract address.
    pub address: Address,
    /// Token name.
    #[serde(default)]
    pub name: Option<String>,
    /// Token symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Token decimals.
    #[serde(default)]
    pub decimals: Option<u8>,
    /// Logo location.
    #[serde(default)]
    pub logo_uri: Option<String>,
}

/// The token-list document, filtered to one chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenListDocument {
    /// Document display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The token entries.
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

/// One entry of the system-contract-list document.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContractInfo {
    /// The chain this entry belongs to.
    #[serde(default)]
    pub chain_id: u64,
    /// The system contract address.
    pub address: Address,
    /// Contract name.
    #[serde(default)]
    pub name: Option<String>,
}

/// The system-contract-list document, filtered to one chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SystemContractListDocument {
    /// The system contract entries.
    #[serde(default)]
    pub contracts: Vec<SystemContractInfo>,
}

/// Fetches the two list documents and filters them by chain id.
pub struct ListDocumentClient {
    chain_id: u64,
    token_list_url: Url,
    system_contract_list_url: Url,
    client: Arc<ClientWithMiddleware>,
}

impl ListDocumentClient {
    /// Creates a new list-document client.
    pub fn new(
        chain_id: u64,
        token_list_url: Url,
        system_contract_list_url: Url,
        client: Arc<ClientWithMiddleware>,
    ) -> Self {
        Self { chain_id, token_list_url, system_contract_list_url, client }
    }

    /// Fetches the token-list document and keeps only this chain's entries.
    pub async fn fetch_token_list(&self) -> Result<TokenListDocument, ListDocumentError> {
        let response = self.client.get(self.token_list_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ListDocumentError::Status(response.status()));
        }

        let mut document: TokenListDocument = response.json().await?;
        document.tokens.retain(|token| token.chain_id == self.chain_id);
        Ok(document)
    }

    /// Fetches the system-contract-list document and keeps only this chain's
    /// entries.
    pub async fn fetch_system_contract_list(
        &self,
    ) -> Result<SystemContractListDocument, ListDocumentError> {
        let response = self.client.get(self.system_contract_list_url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ListDocumentError::Status(response.status()));
        }

        let mut document: SystemContractListDocument = response.json().await?;
        document.contracts.retain(|contract| contract.chain_id == self.chain_id);
        Ok(document)
    }
}
