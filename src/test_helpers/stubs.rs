//! Hand-rolled collaborator stubs for tests that exercise full resolution
//! and decode flows without a network.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::primitives::{Address, B256, Selector};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::http_client::create_test_http_client;
use crate::{
    contracts::ContractService,
    models::{Nft, RawContract},
    providers::{
        ContractDataSource, IndexerError, ListDocumentClient, NftUriSource, RpcSourceError,
        StoreError, VerifiedContractStore,
    },
    signatures::{SignatureSource, SignatureSourceError},
};

/// A `ContractDataSource` serving canned records, with a call counter and an
/// optional per-call delay for coalescing tests.
pub struct StaticIndexer {
    contracts: Vec<RawContract>,
    nfts: Vec<Nft>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl StaticIndexer {
    /// Creates an indexer stub serving the given contract records.
    pub fn new(contracts: Vec<RawContract>) -> Self {
        Self { contracts, nfts: Vec::new(), delay: Duration::ZERO, calls: Arc::new(AtomicUsize::new(0)) }
    }

    /// Adds NFT records served by `fetch_nfts`.
    pub fn with_nfts(mut self, nfts: Vec<Nft>) -> Self {
        self.nfts = nfts;
        self
    }

    /// Delays every `fetch_contract` call, keeping the fetch in flight long
    /// enough for other callers to pile up.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The `fetch_contract` call counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ContractDataSource for StaticIndexer {
    async fn fetch_contract(&self, address: Address) -> Result<Option<RawContract>, IndexerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.contracts.iter().find(|raw| raw.address == address).cloned())
    }

    async fn fetch_nfts(
        &self,
        _address: Address,
        token_id: Option<String>,
    ) -> Result<Vec<Nft>, IndexerError> {
        Ok(match token_id {
            Some(token_id) => {
                self.nfts.iter().filter(|nft| nft.id == token_id).cloned().collect()
            }
            None => self.nfts.clone(),
        })
    }
}

/// A `VerifiedContractStore` serving canned documents.
pub struct StaticVerifiedStore {
    metadata: Option<Value>,
    source: Option<Value>,
}

impl StaticVerifiedStore {
    /// A store with nothing verified.
    pub fn empty() -> Self {
        Self { metadata: None, source: None }
    }

    /// A store serving the given metadata document for every address.
    pub fn with_metadata(metadata: Value) -> Self {
        Self { metadata: Some(metadata), source: None }
    }
}

#[async_trait]
impl VerifiedContractStore for StaticVerifiedStore {
    async fn fetch_metadata(&self, _address: Address) -> Result<Option<Value>, StoreError> {
        Ok(self.metadata.clone())
    }

    async fn fetch_source(&self, _address: Address) -> Result<Option<Value>, StoreError> {
        Ok(self.source.clone())
    }

    async fn is_verified(&self, _address: Address) -> Result<bool, StoreError> {
        Ok(self.metadata.is_some())
    }
}

/// An `NftUriSource` serving a canned URI for every token.
pub struct StaticNftSource {
    uri: Option<String>,
}

impl StaticNftSource {
    /// A source that never resolves a URI.
    pub fn empty() -> Self {
        Self { uri: None }
    }

    /// A source serving the given URI for every token.
    pub fn with_uri(uri: &str) -> Self {
        Self { uri: Some(uri.to_string()) }
    }
}

#[async_trait]
impl NftUriSource for StaticNftSource {
    async fn token_uri(
        &self,
        _contract: Address,
        _token_id: &str,
    ) -> Result<Option<String>, RpcSourceError> {
        Ok(self.uri.clone())
    }
}

/// A `SignatureSource` serving canned signature text, a miss for everything
/// else.
#[derive(Default)]
pub struct StaticSignatureSource {
    functions: HashMap<Selector, String>,
    events: HashMap<B256, String>,
}

impl StaticSignatureSource {
    /// A source that always misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a function signature.
    pub fn with_function(mut self, selector: Selector, signature: &str) -> Self {
        self.functions.insert(selector, signature.to_string());
        self
    }

    /// Adds an event signature.
    pub fn with_event(mut self, topic: B256, signature: &str) -> Self {
        self.events.insert(topic, signature.to_string());
        self
    }
}

#[async_trait]
impl SignatureSource for StaticSignatureSource {
    async fn function_signature(
        &self,
        selector: Selector,
    ) -> Result<Option<String>, SignatureSourceError> {
        Ok(self.functions.get(&selector).cloned())
    }

    async fn event_signature(&self, topic: B256) -> Result<Option<String>, SignatureSourceError> {
        Ok(self.events.get(&topic).cloned())
    }
}

/// A list-document client pointed at an unroutable endpoint, for tests that
/// never touch the list singletons.
pub fn create_test_list_client() -> ListDocumentClient {
    let base = Url::parse("http://127.0.0.1:9").expect("static url");
    ListDocumentClient::new(
        40,
        base.join("/tokenlist.json").expect("static url"),
        base.join("/systemcontractlist.json").expect("static url"),
        create_test_http_client(),
    )
}

/// Creates a `ContractService` over static stubs serving the given contract
/// records.
pub fn create_test_contract_service(contracts: Vec<RawContract>) -> Arc<ContractService> {
    Arc::new(ContractService::new(
        Arc::new(StaticIndexer::new(contracts)),
        Arc::new(StaticVerifiedStore::empty()),
        Arc::new(StaticNftSource::empty()),
        create_test_list_client(),
    ))
}
