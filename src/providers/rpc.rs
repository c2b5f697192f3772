//! Chain RPC access: provider construction with retry and fallback layers,
//! and the last-resort NFT token-URI reader.

use std::num::NonZeroUsize;

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{Address, Bytes, Selector, U256, fixed_bytes},
    providers::{Provider, ProviderBuilder},
    rpc::{client::RpcClient, types::TransactionRequest},
    transports::{
        http::{Http, reqwest::Url},
        layers::{FallbackLayer, RetryBackoffLayer},
    },
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tower::ServiceBuilder;

use crate::config::RpcRetryConfig;

/// Selector of `tokenURI(uint256)` from the erc721 metadata interface.
const TOKEN_URI_SELECTOR: Selector = fixed_bytes!("0xc87b56dd");

/// Custom error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Error when creating the provider.
    #[error("Provider creation failed: {0}")]
    CreationError(String),
}

/// Errors that can occur while reading from the chain RPC.
#[derive(Debug, Error)]
pub enum RpcSourceError {
    /// The token id is not a decimal integer.
    #[error("Token id '{0}' is not a decimal integer")]
    InvalidTokenId(String),
    /// The RPC call failed.
    #[error("RPC call failed: {0}")]
    Rpc(#[from] alloy::transports::TransportError),
    /// The call returned data that does not decode as a string.
    #[error("Failed to decode tokenURI return data: {0}")]
    Decode(#[from] alloy::dyn_abi::Error),
}

/// A last-resort source for a single NFT's token URI, read directly from the
/// contract when the indexer has no record yet.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NftUriSource: Send + Sync {
    /// Reads `tokenURI(tokenId)` from the contract.
    async fn token_uri(
        &self,
        contract: Address,
        token_id: &str,
    ) -> Result<Option<String>, RpcSourceError>;
}

/// `NftUriSource` backed by an RPC provider.
pub struct RpcNftReader<P> {
    provider: P,
}

impl<P> RpcNftReader<P>
where
    P: Provider,
{
    /// Creates a new reader over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> NftUriSource for RpcNftReader<P>
where
    P: Provider + Send + Sync,
{
    async fn token_uri(
        &self,
        contract: Address,
        token_id: &str,
    ) -> Result<Option<String>, RpcSourceError> {
        let id: U256 = token_id
            .parse()
            .map_err(|_| RpcSourceError::InvalidTokenId(token_id.to_string()))?;

        let mut calldata = Vec::with_capacity(36);
        calldata.extend_from_slice(TOKEN_URI_SELECTOR.as_slice());
        calldata.extend_from_slice(&id.to_be_bytes::<32>());

        let tx = TransactionRequest::default()
            .to(contract)
            .input(Bytes::from(calldata).into());
        let output = self.provider.call(tx).await?;

        let decoded = DynSolType::Tuple(vec![DynSolType::String]).abi_decode(&output)?;
        let uri = match decoded {
            DynSolValue::Tuple(values) => values.into_iter().next().and_then(|value| match value {
                DynSolValue::String(uri) => Some(uri),
                _ => None,
            }),
            _ => None,
        };
        Ok(uri)
    }
}

/// Creates a new provider with the given RPC URLs.
pub fn create_provider(
    urls: Vec<Url>,
    retry_config: RpcRetryConfig,
) -> Result<impl Provider, ProviderError> {
    if urls.is_empty() {
        return Err(ProviderError::CreationError("RPC URL list cannot be empty".into()));
    }

    let fallback_layer = FallbackLayer::default().with_active_transport_count(
        NonZeroUsize::new(urls.len()).expect("At least one URL is required"),
    );

    let transports: Vec<_> = urls.into_iter().map(Http::new).collect();

    let retry_layer = RetryBackoffLayer::new(
        retry_config.max_retry,
        retry_config.backoff_ms,
        retry_config.compute_units_per_second,
    );

    let service =
        ServiceBuilder::new().layer(retry_layer).layer(fallback_layer).service(transports);

    let client = RpcClient::builder().transport(service, false);
    let provider = ProviderBuilder::new().connect_client(client);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_create_provider_rejects_empty_url_list() {
        let result = create_provider(vec![], RpcRetryConfig::default());
        assert!(matches!(result, Err(ProviderError::CreationError(_))));
    }

    #[test]
    fn test_create_provider_accepts_urls() {
        let urls = vec![Url::parse("http://localhost:8545").unwrap()];
        assert!(create_provider(urls, RpcRetryConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_token_uri_rejects_non_decimal_token_id() {
        let provider =
            create_provider(vec![Url::parse("http://localhost:8545").unwrap()], Default::default())
                .unwrap();
        let reader = RpcNftReader::new(provider);

        let result = reader
            .token_uri(address!("2222222222222222222222222222222222222222"), "not-a-number")
            .await;
        assert!(matches!(result, Err(RpcSourceError::InvalidTokenId(_))));
    }
}
