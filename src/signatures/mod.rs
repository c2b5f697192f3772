//! The signature registry: selector-to-signature and topic-to-signature
//! maps, seeded from static override tables and lazily extended by
//! successful remote lookups.

mod overrides;
pub mod resolver;

use alloy::primitives::{B256, Selector, b256};
use dashmap::DashMap;

pub use resolver::{HttpSignatureSource, SignatureSource, SignatureSourceError};

/// Topic hash of `Transfer(address,address,uint256)`, shared by erc20 and
/// erc721.
pub const TRANSFER_TOPIC: B256 =
    b256!("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// Topic hash of the erc1155 `TransferSingle(address,address,address,uint256,uint256)`.
pub const ERC1155_TRANSFER_SINGLE_TOPIC: B256 =
    b256!("0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62");

/// Topic hash of the erc1155 `TransferBatch(address,address,address,uint256[],uint256[])`.
pub const ERC1155_TRANSFER_BATCH_TOPIC: B256 =
    b256!("0x4a39dc06d4c0dbc64b70af90fd698a233a518aa5d07e595d983b8c0526c8f7fb");

/// The topic hashes recognized as asset-transfer events.
pub const TRANSFER_SIGNATURES: [B256; 3] =
    [TRANSFER_TOPIC, ERC1155_TRANSFER_SINGLE_TOPIC, ERC1155_TRANSFER_BATCH_TOPIC];

/// True when `topic` is one of the known transfer-event signatures.
pub fn is_transfer_topic(topic: B256) -> bool {
    TRANSFER_SIGNATURES.contains(&topic)
}

/// In-memory mapping from function selectors and event topic hashes to
/// human-readable signature strings.
///
/// Entries are write-once: a recorded signature is never overwritten by a
/// later lookup, and the static overrides seeded at construction always
/// take precedence.
#[derive(Debug)]
pub struct SignatureRegistry {
    functions: DashMap<Selector, String>,
    events: DashMap<B256, String>,
}

impl SignatureRegistry {
    /// Creates a registry seeded from the static override tables.
    pub fn new() -> Self {
        let functions = DashMap::new();
        for (selector, signature) in overrides::FUNCTION_OVERRIDES {
            functions.insert(*selector, (*signature).to_string());
        }
        let events = DashMap::new();
        for (topic, signature) in overrides::EVENT_OVERRIDES {
            events.insert(*topic, (*signature).to_string());
        }
        Self { functions, events }
    }

    /// Looks up the signature text for a function selector.
    pub fn lookup_function(&self, selector: Selector) -> Option<String> {
        self.functions.get(&selector).map(|entry| entry.clone())
    }

    /// Looks up the signature text for an event topic hash.
    pub fn lookup_event(&self, topic: B256) -> Option<String> {
        self.events.get(&topic).map(|entry| entry.clone())
    }

    /// Records a resolved function signature. No-op when the selector is
    /// already mapped.
    pub fn record_function(&self, selector: Selector, signature: &str) {
        self.functions.entry(selector).or_insert_with(|| signature.to_string());
    }

    /// Records a resolved event signature. No-op when the topic is already
    /// mapped.
    pub fn record_event(&self, topic: B256, signature: &str) {
        self.events.entry(topic).or_insert_with(|| signature.to_string());
    }

    /// Number of known function signatures.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of known event signatures.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
