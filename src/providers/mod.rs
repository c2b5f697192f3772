//! Clients for the remote collaborators: the indexer API, the
//! verified-contract object store, the public list documents, and the chain
//! RPC fallback.

pub mod bucket;
pub mod indexer;
pub mod rpc;
pub mod token_list;

pub use bucket::{HttpVerifiedContractStore, StoreError, VerifiedContractStore};
pub use indexer::{ContractDataSource, HttpIndexerClient, IndexerError};
pub use rpc::{NftUriSource, ProviderError, RpcNftReader, RpcSourceError, create_provider};
pub use token_list::{
    ListDocumentClient, ListDocumentError, SystemContractInfo, SystemContractListDocument,
    TokenInfo, TokenListDocument,
};
