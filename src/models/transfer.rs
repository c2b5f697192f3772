//! Derived asset-transfer records.

use alloy::primitives::{Address, B256, Bytes};

/// A fungible-asset movement derived from a transfer log.
///
/// Not stored: produced on demand by
/// [`LogDecoder::extract_transfers`](crate::decoder::LogDecoder::extract_transfers)
/// and ordered by `log_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Position of the originating log within its block.
    pub log_index: u64,
    /// The token contract that emitted the log.
    pub address: Address,
    /// The transferred amount, verbatim from the log data.
    pub value: Bytes,
    /// Token decimals from the contract's cached properties, when known.
    pub decimals: Option<u8>,
    /// Receiving account, from topic 1.
    pub to: Address,
    /// Sending account, from topic 2.
    pub from: Address,
    /// Token symbol from the contract's cached properties, when known.
    pub symbol: Option<String>,
}

/// Truncates a 32-byte topic to the address packed in its last 20 bytes.
pub fn address_from_topic(topic: &B256) -> Address {
    Address::from_slice(&topic[12..])
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;

    #[test]
    fn test_address_from_topic_truncates_left_padding() {
        let topic = b256!("000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        assert_eq!(
            address_from_topic(&topic),
            address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
        );
    }
}
