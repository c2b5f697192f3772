//! The contract entity and its associated records.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256, hex},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A token standard a contract can declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStandard {
    /// Fungible token standard.
    Erc20,
    /// Non-fungible token standard.
    Erc721,
    /// Multi-token standard.
    Erc1155,
}

impl TokenStandard {
    /// Parses an interface tag as served by the indexer. Unknown tags are
    /// not an error; the caller skips them.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "erc20" => Some(Self::Erc20),
            "erc721" => Some(Self::Erc721),
            "erc1155" => Some(Self::Erc1155),
            _ => None,
        }
    }

    /// The canonical lower-case tag for this standard.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erc20 => "erc20",
            Self::Erc721 => "erc721",
            Self::Erc1155 => "erc1155",
        }
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and by whom a contract was created. The three fields are known
/// together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationInfo {
    /// The account that deployed the contract.
    pub creator: Address,
    /// The deployment transaction.
    pub transaction_hash: B256,
    /// The block the deployment was included in.
    pub block_number: u64,
}

/// A single NFT record, populated lazily from the indexer or a chain read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    /// Token id, kept as a string key.
    #[serde(rename = "tokenId")]
    pub id: String,
    /// The token's metadata URI, when known.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Resolved metadata document, when known.
    #[serde(default)]
    pub metadata: Option<Value>,
    /// Cached image location, when known.
    #[serde(default)]
    pub image_cache: Option<String>,
}

/// One on-chain contract as known to this process.
///
/// Instances are built by the [`ContractFactory`](crate::contracts::ContractFactory)
/// and live in the [`ContractCache`](crate::contracts::ContractCache) for the
/// lifetime of the process. A contract without an ABI is a fetched-but-
/// unverified record, distinct from "never looked up".
#[derive(Debug, Clone, Default)]
pub struct Contract {
    /// Canonical address; the unique cache key.
    pub address: Address,
    /// Display name; synthesized from the address prefix when unknown.
    pub name: Option<String>,
    /// True iff ABI/metadata was found for this contract.
    pub verified: bool,
    /// Creation details, absent together when unknown.
    pub creation_info: Option<CreationInfo>,
    /// Parsed ABI; presence enables exact decoding.
    pub abi: Option<Arc<JsonAbi>>,
    /// Token standards this contract declares support for.
    pub supported_interfaces: HashSet<TokenStandard>,
    /// Decoded static properties (token name, symbol, decimals, ...).
    pub properties: Map<String, Value>,
    /// Lazily populated NFT records, keyed by token id.
    pub nfts: HashMap<String, Nft>,
}

impl Contract {
    /// Number of fragments in the contract's ABI, zero when absent.
    pub fn abi_len(&self) -> usize {
        self.abi.as_ref().map(|abi| abi.len()).unwrap_or(0)
    }

    /// True when the contract carries a non-empty ABI.
    pub fn has_abi(&self) -> bool {
        self.abi_len() > 0
    }

    /// True when the contract is tagged with the given token standard.
    pub fn supports(&self, standard: TokenStandard) -> bool {
        self.supported_interfaces.contains(&standard)
    }

    /// The token symbol from the decoded properties, when present.
    pub fn symbol(&self) -> Option<String> {
        self.properties.get("symbol").and_then(Value::as_str).map(str::to_owned)
    }

    /// The token decimals from the decoded properties, when present.
    /// Indexers serve this both as a number and as a string.
    pub fn decimals(&self) -> Option<u8> {
        let value = self.properties.get("decimals")?;
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The display name, falling back to the synthesized address prefix.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| synthesized_name(&self.address))
    }
}

/// Builds a placeholder display name from the first 8 bytes of an address.
pub fn synthesized_name(address: &Address) -> String {
    format!("0x{}...", hex::encode(&address.as_slice()[..8]))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_token_standard_tags() {
        assert_eq!(TokenStandard::from_tag("erc20"), Some(TokenStandard::Erc20));
        assert_eq!(TokenStandard::from_tag("erc721"), Some(TokenStandard::Erc721));
        assert_eq!(TokenStandard::from_tag("erc1155"), Some(TokenStandard::Erc1155));
        assert_eq!(TokenStandard::from_tag("erc777"), None);
        assert_eq!(TokenStandard::Erc20.to_string(), "erc20");
    }

    #[test]
    fn test_synthesized_name_uses_first_eight_bytes() {
        let addr = address!("d00d1e2838cbbe4be964d2b7e1e5e1a5e97e1e5e");
        assert_eq!(synthesized_name(&addr), "0xd00d1e2838cbbe4b...");
    }

    #[test]
    fn test_decimals_accepts_number_and_string() {
        let mut contract = Contract::default();
        contract.properties.insert("decimals".into(), json!(18));
        assert_eq!(contract.decimals(), Some(18));

        contract.properties.insert("decimals".into(), json!("6"));
        assert_eq!(contract.decimals(), Some(6));

        contract.properties.insert("decimals".into(), json!(null));
        assert_eq!(contract.decimals(), None);
    }

    #[test]
    fn test_display_name_falls_back_to_synthesized() {
        let mut contract = Contract {
            address: address!("d00d1e2838cbbe4be964d2b7e1e5e1a5e97e1e5e"),
            ..Default::default()
        };
        assert_eq!(contract.display_name(), "0xd00d1e2838cbbe4b...");

        contract.name = Some("Wrapped TLOS".into());
        assert_eq!(contract.display_name(), "Wrapped TLOS");
    }

    #[test]
    fn test_nft_deserializes_indexer_shape() {
        let nft: Nft = serde_json::from_value(json!({
            "tokenId": "42",
            "tokenUri": "ipfs://QmHash/42.json",
            "metadata": {"name": "Piece #42"},
            "imageCache": null,
        }))
        .unwrap();
        assert_eq!(nft.id, "42");
        assert_eq!(nft.token_uri.as_deref(), Some("ipfs://QmHash/42.json"));
        assert!(nft.image_cache.is_none());
    }
}
