//! Builds contract entities from raw indexer and store payloads.

use std::sync::Arc;

use alloy::{json_abi::JsonAbi, primitives::Address};
use serde_json::{Map, Value};

use crate::models::{Contract, CreationInfo, RawContract, TokenStandard, contract::synthesized_name};

/// Builds [`Contract`] entities, deciding verified status and decoding
/// nested JSON defensively: malformed payloads degrade to absent fields,
/// never to an error.
#[derive(Debug, Default)]
pub struct ContractFactory;

impl ContractFactory {
    /// Creates a new factory.
    pub fn new() -> Self {
        Self
    }

    /// Builds a contract from a raw indexer payload, enriched with store
    /// metadata when the service found any.
    pub fn build(&self, raw: RawContract) -> Contract {
        let abi = raw.metadata.as_ref().and_then(|value| parse_abi(raw.address, value));
        let verified = abi.is_some();

        let creation_info = match (raw.creator, raw.transaction, raw.block) {
            (Some(creator), Some(transaction_hash), Some(block_number)) => {
                Some(CreationInfo { creator, transaction_hash, block_number })
            }
            _ => None,
        };

        let supported_interfaces = raw
            .supported_interfaces
            .iter()
            .filter_map(|tag| TokenStandard::from_tag(tag))
            .collect();

        let properties = raw
            .calldata
            .as_deref()
            .map(|calldata| parse_properties(raw.address, calldata))
            .unwrap_or_default();

        Contract {
            address: raw.address,
            name: raw.name,
            verified,
            creation_info,
            abi: abi.map(Arc::new),
            supported_interfaces,
            properties,
            nfts: Default::default(),
        }
    }

    /// Synthesizes an empty placeholder record for an address nothing is
    /// known about.
    pub fn build_empty(&self, address: Address) -> Contract {
        Contract { address, name: Some(synthesized_name(&address)), ..Default::default() }
    }

    /// Extracts the ABI value from a verified-contract metadata document.
    /// The store serves either the bare ABI array or a compiler metadata
    /// object carrying it under `abi` or `output.abi`.
    pub fn extract_abi_value(metadata: &Value) -> Option<Value> {
        if metadata.is_array() {
            return Some(metadata.clone());
        }
        metadata.get("abi").cloned().or_else(|| metadata.pointer("/output/abi").cloned())
    }
}

/// Parses an ABI served either inline or as a JSON-encoded string. An empty
/// or malformed ABI is treated as absent.
fn parse_abi(address: Address, value: &Value) -> Option<JsonAbi> {
    let parsed = match value {
        Value::String(encoded) => serde_json::from_str::<JsonAbi>(encoded),
        other => serde_json::from_value(other.clone()),
    };

    match parsed {
        Ok(abi) if !abi.is_empty() => Some(abi),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(%address, error = %e, "Contract metadata does not parse as an ABI.");
            None
        }
    }
}

/// Parses the JSON-encoded static properties. Malformed payloads yield an
/// empty mapping.
fn parse_properties(address: Address, calldata: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(calldata) {
        Ok(Value::Object(properties)) => properties,
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::warn!(%address, error = %e, "Contract properties do not parse as JSON.");
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};
    use serde_json::json;

    use super::*;
    use crate::test_helpers::erc20_abi_json;

    #[test]
    fn test_build_with_inline_abi_is_verified() {
        let factory = ContractFactory::new();
        let raw = RawContract {
            address: address!("2222222222222222222222222222222222222222"),
            name: Some("Tether USD".into()),
            metadata: Some(serde_json::from_str(erc20_abi_json()).unwrap()),
            supported_interfaces: vec!["erc20".into()],
            calldata: Some(r#"{"symbol": "USDT", "decimals": 6}"#.into()),
            ..Default::default()
        };

        let contract = factory.build(raw);

        assert!(contract.verified);
        assert!(contract.has_abi());
        assert!(contract.supports(TokenStandard::Erc20));
        assert_eq!(contract.symbol().as_deref(), Some("USDT"));
        assert_eq!(contract.decimals(), Some(6));
    }

    #[test]
    fn test_build_with_string_encoded_abi() {
        let factory = ContractFactory::new();
        let raw = RawContract {
            address: address!("2222222222222222222222222222222222222222"),
            metadata: Some(Value::String(erc20_abi_json().to_string())),
            ..Default::default()
        };

        let contract = factory.build(raw);
        assert!(contract.verified);
        assert!(contract.has_abi());
    }

    #[test]
    fn test_build_without_metadata_is_unverified() {
        let factory = ContractFactory::new();
        let raw = RawContract::empty(address!("2222222222222222222222222222222222222222"));

        let contract = factory.build(raw);
        assert!(!contract.verified);
        assert!(contract.abi.is_none());
        assert!(contract.properties.is_empty());
    }

    #[test]
    fn test_build_with_malformed_metadata_degrades() {
        let factory = ContractFactory::new();
        let raw = RawContract {
            address: address!("2222222222222222222222222222222222222222"),
            metadata: Some(Value::String("{not an abi".into())),
            calldata: Some("{not json".into()),
            ..Default::default()
        };

        let contract = factory.build(raw);
        assert!(!contract.verified);
        assert!(contract.abi.is_none());
        assert!(contract.properties.is_empty());
    }

    #[test]
    fn test_build_creation_info_is_all_or_nothing() {
        let factory = ContractFactory::new();
        let mut raw = RawContract {
            address: address!("2222222222222222222222222222222222222222"),
            creator: Some(address!("1111111111111111111111111111111111111111")),
            transaction: Some(b256!(
                "4444444444444444444444444444444444444444444444444444444444444444"
            )),
            ..Default::default()
        };
        // Block number missing: no creation info.
        assert!(factory.build(raw.clone()).creation_info.is_none());

        raw.block = Some(1_234_567);
        let contract = factory.build(raw);
        let creation_info = contract.creation_info.unwrap();
        assert_eq!(creation_info.block_number, 1_234_567);
    }

    #[test]
    fn test_build_skips_unknown_interface_tags() {
        let factory = ContractFactory::new();
        let raw = RawContract {
            address: address!("2222222222222222222222222222222222222222"),
            supported_interfaces: vec!["erc721".into(), "erc777".into()],
            ..Default::default()
        };

        let contract = factory.build(raw);
        assert!(contract.supports(TokenStandard::Erc721));
        assert_eq!(contract.supported_interfaces.len(), 1);
    }

    #[test]
    fn test_build_empty_synthesizes_name() {
        let factory = ContractFactory::new();
        let contract =
            factory.build_empty(address!("d00d1e2838cbbe4be964d2b7e1e5e1a5e97e1e5e"));

        assert_eq!(contract.name.as_deref(), Some("0xd00d1e2838cbbe4b..."));
        assert!(!contract.verified);
    }

    #[test]
    fn test_extract_abi_value_shapes() {
        let bare = json!([{"type": "function", "name": "f", "inputs": [], "outputs": []}]);
        assert_eq!(ContractFactory::extract_abi_value(&bare), Some(bare.clone()));

        let wrapped = json!({"abi": bare});
        assert_eq!(ContractFactory::extract_abi_value(&wrapped), Some(bare.clone()));

        let compiler = json!({"output": {"abi": bare}});
        assert_eq!(ContractFactory::extract_abi_value(&compiler), Some(bare));

        assert_eq!(ContractFactory::extract_abi_value(&json!({"source": "..."})), None);
    }
}
