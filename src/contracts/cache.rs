//! The process-lifetime contract record cache.

use alloy::primitives::Address;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::models::{Contract, Nft};

/// Returns true when `incoming` should replace `cached`.
///
/// The rule is monotonic: a record is only replaced by one carrying more ABI
/// information, so a later, less-informative fetch can never clobber a
/// resolved ABI.
fn should_replace(cached: &Contract, incoming: &Contract) -> bool {
    let incoming_len = incoming.abi_len();
    if incoming_len == 0 {
        return false;
    }
    match cached.abi_len() {
        0 => true,
        cached_len => incoming_len > cached_len,
    }
}

/// Cache of contract records, keyed by address.
///
/// The single source of truth for "do we already know this contract". A
/// cached record with no ABI means "looked up and unverified", which is
/// distinct from having no record at all. Records are never evicted.
#[derive(Debug, Default)]
pub struct ContractCache {
    contracts: DashMap<Address, Contract>,
}

impl ContractCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record for `address`, if any. Never touches the
    /// network.
    pub fn get(&self, address: Address) -> Option<Contract> {
        self.contracts.get(&address).map(|entry| entry.clone())
    }

    /// True when a record exists for `address`.
    pub fn contains(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// True when the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Inserts or upgrades the record for `contract.address` under the
    /// monotonic merge rule, and returns the record now cached (which may be
    /// the previously cached one when the incoming record loses).
    pub fn upsert(&self, contract: Contract) -> Contract {
        match self.contracts.entry(contract.address) {
            Entry::Vacant(entry) => entry.insert(contract).clone(),
            Entry::Occupied(mut entry) => {
                if should_replace(entry.get(), &contract) {
                    *entry.get_mut() = contract;
                }
                entry.get().clone()
            }
        }
    }

    /// Records an NFT under its contract, creating a bare record when the
    /// contract has not been cached yet. Returns the inserted NFT.
    pub fn insert_nft(&self, address: Address, nft: Nft) -> Nft {
        let mut entry = self
            .contracts
            .entry(address)
            .or_insert_with(|| Contract { address, ..Default::default() });
        entry.nfts.insert(nft.id.clone(), nft.clone());
        nft
    }

    /// Returns a cached NFT record, if any.
    pub fn get_nft(&self, address: Address, token_id: &str) -> Option<Nft> {
        self.contracts
            .get(&address)
            .and_then(|entry| entry.nfts.get(token_id).cloned())
    }
}
