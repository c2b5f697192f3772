//! Serde models of the indexer wire payloads.
//!
//! These are intentionally permissive: all payloads come from upstream
//! services that evolve independently, so every optional field defaults and
//! nested JSON is carried opaquely until the factory decodes it.

use alloy::primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contract record as served by the indexer
/// (`GET /contract/{address}?full=true&includeAbi=true`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawContract {
    /// The contract address.
    pub address: Address,
    /// Display name, when the indexer knows one.
    pub name: Option<String>,
    /// Deployer account.
    pub creator: Option<Address>,
    /// Deployment transaction hash.
    pub transaction: Option<B256>,
    /// Deployment block number.
    pub block: Option<u64>,
    /// Interface tags ("erc20", "erc721", ...); unknown tags are skipped.
    pub supported_interfaces: Vec<String>,
    /// JSON-encoded static properties (token name, symbol, decimals, ...).
    pub calldata: Option<String>,
    /// The ABI, either as a JSON array or as a JSON-encoded string.
    pub metadata: Option<Value>,
}

impl RawContract {
    /// A payload carrying nothing but the address, used to cache the
    /// "looked up and unverified" state.
    pub fn empty(address: Address) -> Self {
        Self { address, ..Default::default() }
    }
}

/// A single event log as served by the indexer within a transaction record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLog {
    /// The emitting contract.
    pub address: Address,
    /// Topic list; the first entry is the event-signature hash.
    pub topics: Vec<B256>,
    /// Non-indexed event data, verbatim.
    pub data: Bytes,
    /// Position of the log within its block.
    pub log_index: u64,
}

impl RawLog {
    /// The event-signature hash, if the log has any topics.
    pub fn topic0(&self) -> Option<B256> {
        self.topics.first().copied()
    }
}

/// The indexer serves transaction logs either inline or as a JSON-encoded
/// string; both shapes decode into this enum.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawLogs {
    /// Logs already materialized as an array.
    Parsed(Vec<RawLog>),
    /// Logs still JSON-encoded as a string.
    Encoded(String),
}

impl RawLogs {
    /// Materializes the log list, parsing the encoded form if needed.
    /// Malformed payloads yield an empty list, not an error.
    pub fn parse(&self) -> Vec<RawLog> {
        match self {
            Self::Parsed(logs) => logs.clone(),
            Self::Encoded(s) => serde_json::from_str(s).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not parse encoded transaction logs.");
                Vec::new()
            }),
        }
    }
}

/// A transaction record as served by the indexer, reduced to the fields the
/// decoder consumes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    /// Transaction hash.
    pub hash: Option<B256>,
    /// Recipient contract, absent for contract creations.
    pub to: Option<Address>,
    /// Calldata, verbatim.
    pub input: Option<Bytes>,
    /// Event logs emitted by the transaction.
    pub logs: Option<RawLogs>,
}

impl RawTransaction {
    /// Materializes the transaction's logs; absent or malformed payloads
    /// yield an empty list.
    pub fn parsed_logs(&self) -> Vec<RawLog> {
        self.logs.as_ref().map(RawLogs::parse).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_raw_contract_tolerates_missing_fields() {
        let raw: RawContract = serde_json::from_value(json!({
            "address": "0x2222222222222222222222222222222222222222",
        }))
        .unwrap();
        assert_eq!(raw.address, address!("2222222222222222222222222222222222222222"));
        assert!(raw.name.is_none());
        assert!(raw.supported_interfaces.is_empty());
        assert!(raw.metadata.is_none());
    }

    #[test]
    fn test_raw_logs_inline_and_encoded() {
        let inline: RawLogs = serde_json::from_value(json!([
            {"address": "0x1111111111111111111111111111111111111111", "logIndex": 3}
        ]))
        .unwrap();
        assert_eq!(inline.parse().len(), 1);
        assert_eq!(inline.parse()[0].log_index, 3);

        let encoded = RawLogs::Encoded(
            r#"[{"address": "0x1111111111111111111111111111111111111111", "logIndex": 3}]"#.into(),
        );
        assert_eq!(encoded.parse().len(), 1);
    }

    #[test]
    fn test_raw_logs_malformed_string_yields_empty() {
        let encoded = RawLogs::Encoded("{not json".into());
        assert!(encoded.parse().is_empty());
    }

    #[test]
    fn test_raw_transaction_without_logs() {
        let tx = RawTransaction::default();
        assert!(tx.parsed_logs().is_empty());
    }
}
