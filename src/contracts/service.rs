//! The contract service: cache, coalescer, factory, and remote clients
//! composed into the resolution API consumed by the rest of the system.

use std::sync::Arc;

use alloy::primitives::{Address, hex};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{
    cache::ContractCache,
    coalescer::{CoalesceOutcome, FetchCoalescer},
    factory::ContractFactory,
};
use crate::{
    config::AppConfig,
    http_client::{HttpClientPool, HttpClientPoolError},
    models::{Contract, Nft, RawContract},
    providers::{
        ContractDataSource, HttpIndexerClient, HttpVerifiedContractStore, ListDocumentClient,
        NftUriSource, ProviderError, RpcNftReader, SystemContractListDocument, TokenListDocument,
        VerifiedContractStore, create_provider,
    },
};

/// Coalescer key of the token-list singleton.
const TOKEN_LIST_KEY: &str = "tokenlist";
/// Coalescer key of the system-contract-list singleton.
const SYSTEM_CONTRACT_LIST_KEY: &str = "systemcontractlist";

/// Errors that can occur while wiring the service from configuration.
#[derive(Debug, Error)]
pub enum ServiceSetupError {
    /// Failed to build an HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] HttpClientPoolError),
    /// Failed to build the RPC provider.
    #[error("Failed to build RPC provider: {0}")]
    Provider(#[from] ProviderError),
}

/// Resolves contract records through the cache, the fetch coalescer, and
/// the remote collaborators, and owns the two singleton list documents.
pub struct ContractService {
    cache: ContractCache,
    coalescer: FetchCoalescer,
    factory: ContractFactory,
    indexer: Arc<dyn ContractDataSource>,
    verified_store: Arc<dyn VerifiedContractStore>,
    nft_fallback: Arc<dyn NftUriSource>,
    lists: ListDocumentClient,
    token_list: RwLock<Option<TokenListDocument>>,
    system_contract_list: RwLock<Option<SystemContractListDocument>>,
}

impl ContractService {
    /// Creates a service over the given collaborators.
    pub fn new(
        indexer: Arc<dyn ContractDataSource>,
        verified_store: Arc<dyn VerifiedContractStore>,
        nft_fallback: Arc<dyn NftUriSource>,
        lists: ListDocumentClient,
    ) -> Self {
        Self {
            cache: ContractCache::new(),
            coalescer: FetchCoalescer::new(),
            factory: ContractFactory::new(),
            indexer,
            verified_store,
            nft_fallback,
            lists,
            token_list: RwLock::new(None),
            system_contract_list: RwLock::new(None),
        }
    }

    /// Wires the service from application configuration: one pooled HTTP
    /// client for all collaborators, plus the RPC provider for NFT reads.
    pub async fn from_config(
        config: &AppConfig,
        pool: &HttpClientPool,
    ) -> Result<Self, ServiceSetupError> {
        let client = pool.get_or_create(&config.http_retry_config).await?;
        let indexer =
            Arc::new(HttpIndexerClient::new(config.indexer_url.clone(), client.clone()));
        let verified_store = Arc::new(HttpVerifiedContractStore::new(
            config.verified_contracts_url.clone(),
            client.clone(),
        ));
        let provider = create_provider(config.rpc_urls.clone(), config.rpc_retry_config.clone())?;
        let nft_fallback = Arc::new(RpcNftReader::new(provider));
        let lists = ListDocumentClient::new(
            config.chain_id,
            config.token_list_url.clone(),
            config.system_contract_list_url.clone(),
            client,
        );
        Ok(Self::new(indexer, verified_store, nft_fallback, lists))
    }

    /// Returns the cached record for `address` without touching the network.
    pub fn get_cached_contract(&self, address: Address) -> Option<Contract> {
        self.cache.get(address)
    }

    /// Resolves the contract at `address`, fetching it on a cache miss.
    /// Returns `None` when nothing is known and nothing could be fetched.
    pub async fn get_contract(&self, address: Address) -> Option<Contract> {
        self.get_or_fetch(address, false).await
    }

    /// Resolves the contract at `address`. With `placeholder_if_missing`, a
    /// failed or empty fetch still caches an empty placeholder record, so
    /// the address is remembered as "looked up and unverified".
    ///
    /// Concurrent calls for one address trigger exactly one underlying
    /// fetch; latecomers wait and then read the cache.
    pub async fn get_or_fetch(
        &self,
        address: Address,
        placeholder_if_missing: bool,
    ) -> Option<Contract> {
        if let Some(contract) = self.cache.get(address) {
            return Some(contract);
        }

        let key = hex::encode_prefixed(address);
        let outcome = self
            .coalescer
            .coalesce(&key, || self.fetch_and_cache(address, placeholder_if_missing))
            .await;
        match outcome {
            CoalesceOutcome::Fetched(contract) => contract,
            // A concurrent caller completed the fetch; the cache is now
            // authoritative.
            CoalesceOutcome::Waited => self.cache.get(address),
        }
    }

    /// Leader path of `get_or_fetch`: indexer, store enrichment, factory,
    /// cache write. Every failure degrades to `None`.
    async fn fetch_and_cache(
        &self,
        address: Address,
        placeholder_if_missing: bool,
    ) -> Option<Contract> {
        let raw = match self.indexer.fetch_contract(address).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(%address, error = %e, "Could not retrieve contract from indexer.");
                None
            }
        };

        let contract = match raw {
            Some(mut raw) => {
                // The indexer row may lack an ABI the verified-contract
                // store holds.
                if raw.metadata.is_none() {
                    raw.metadata = self.store_abi(address).await;
                }
                self.factory.build(raw)
            }
            None if placeholder_if_missing => {
                // An unindexed contract may still be verified in the store.
                match self.store_abi(address).await {
                    Some(metadata) => {
                        let mut raw = RawContract::empty(address);
                        raw.metadata = Some(metadata);
                        self.factory.build(raw)
                    }
                    None => self.factory.build_empty(address),
                }
            }
            None => return None,
        };

        Some(self.cache.upsert(contract))
    }

    /// Reads the ABI value for `address` from the verified-contract store,
    /// `None` for the expected unverified case and for store failures.
    async fn store_abi(&self, address: Address) -> Option<serde_json::Value> {
        match self.verified_store.fetch_metadata(address).await {
            Ok(Some(metadata)) => ContractFactory::extract_abi_value(&metadata),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%address, error = %e, "Could not check verified-contract store.");
                None
            }
        }
    }

    /// Returns the token list, fetching it at most once per process; a
    /// failed fetch is not cached and is retried on the next call.
    pub async fn token_list(&self) -> Option<TokenListDocument> {
        if let Some(list) = self.token_list.read().await.clone() {
            return Some(list);
        }

        let outcome = self.coalescer.coalesce(TOKEN_LIST_KEY, || self.fetch_token_list()).await;
        match outcome {
            CoalesceOutcome::Fetched(list) => list,
            CoalesceOutcome::Waited => self.token_list.read().await.clone(),
        }
    }

    async fn fetch_token_list(&self) -> Option<TokenListDocument> {
        match self.lists.fetch_token_list().await {
            Ok(list) => {
                *self.token_list.write().await = Some(list.clone());
                Some(list)
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not fetch token list.");
                None
            }
        }
    }

    /// Returns the system-contract list, fetching it at most once per
    /// process; a failed fetch is not cached and is retried on the next
    /// call.
    pub async fn system_contract_list(&self) -> Option<SystemContractListDocument> {
        if let Some(list) = self.system_contract_list.read().await.clone() {
            return Some(list);
        }

        let outcome = self
            .coalescer
            .coalesce(SYSTEM_CONTRACT_LIST_KEY, || self.fetch_system_contract_list())
            .await;
        match outcome {
            CoalesceOutcome::Fetched(list) => list,
            CoalesceOutcome::Waited => self.system_contract_list.read().await.clone(),
        }
    }

    async fn fetch_system_contract_list(&self) -> Option<SystemContractListDocument> {
        match self.lists.fetch_system_contract_list().await {
            Ok(list) => {
                *self.system_contract_list.write().await = Some(list.clone());
                Some(list)
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not fetch system contract list.");
                None
            }
        }
    }

    /// Loads all indexed NFTs for a contract into the cache and returns
    /// them.
    pub async fn load_nfts(&self, contract: &Contract) -> Vec<Nft> {
        match self.indexer.fetch_nfts(contract.address, None).await {
            Ok(nfts) => {
                for nft in &nfts {
                    self.cache.insert_nft(contract.address, nft.clone());
                }
                nfts
            }
            Err(e) => {
                tracing::info!(
                    address = %contract.address,
                    error = %e,
                    "Could not load NFTs from indexer."
                );
                Vec::new()
            }
        }
    }

    /// Loads one NFT: cache first, then the indexer, then a direct chain
    /// read of the token URI. The chain fallback covers indexing lag on
    /// freshly minted tokens.
    pub async fn load_nft(&self, contract: &Contract, token_id: &str) -> Option<Nft> {
        if let Some(nft) = self.cache.get_nft(contract.address, token_id) {
            return Some(nft);
        }

        match self.indexer.fetch_nfts(contract.address, Some(token_id.to_string())).await {
            Ok(nfts) => {
                if let Some(nft) = nfts.into_iter().next() {
                    return Some(self.cache.insert_nft(contract.address, nft));
                }
                tracing::info!(
                    address = %contract.address,
                    token_id,
                    "Indexer has no record for NFT, trying chain fallback."
                );
            }
            Err(e) => {
                tracing::info!(
                    address = %contract.address,
                    token_id,
                    error = %e,
                    "Could not load NFT from indexer, trying chain fallback."
                );
            }
        }

        match self.nft_fallback.token_uri(contract.address, token_id).await {
            Ok(Some(token_uri)) => {
                let nft = Nft {
                    id: token_id.to_string(),
                    token_uri: Some(token_uri),
                    metadata: None,
                    image_cache: None,
                };
                Some(self.cache.insert_nft(contract.address, nft))
            }
            Ok(None) => None,
            Err(e) => {
                tracing::error!(
                    address = %contract.address,
                    token_id,
                    error = %e,
                    "Could not load NFT from chain fallback."
                );
                None
            }
        }
    }

    /// Existence probe against the verified-contract store.
    pub async fn is_verified(&self, address: Address) -> bool {
        match self.verified_store.is_verified(address).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::warn!(%address, error = %e, "Could not probe verified-contract store.");
                false
            }
        }
    }

    /// Fetches the verified source document for a contract, when one exists.
    pub async fn fetch_source(&self, address: Address) -> Option<Value> {
        match self.verified_store.fetch_source(address).await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(%address, error = %e, "Could not fetch contract source.");
                None
            }
        }
    }
}
