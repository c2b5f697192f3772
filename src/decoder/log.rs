//! Decodes event logs and classifies asset transfers.

use std::sync::Arc;

use alloy::{
    dyn_abi::{self, DynSolValue, EventExt},
    json_abi::{Event, EventParam},
    primitives::{Address, B256},
};

use super::{DecodeStrategy, find_event};
use crate::{
    contracts::ContractService,
    models::{Contract, Log, RawTransaction, TokenStandard, Transfer, transfer::address_from_topic},
    signatures::{
        ERC1155_TRANSFER_BATCH_TOPIC, ERC1155_TRANSFER_SINGLE_TOPIC, SignatureRegistry,
        SignatureSource, is_transfer_topic,
    },
};

/// A decoded event log.
///
/// Always carries the raw log's identity; name, inputs, and params are
/// filled only when signature resolution succeeded. An unresolvable log is
/// still returned with its raw fields ("best effort, never drop data").
#[derive(Debug, Clone)]
pub struct DecodedLog {
    /// Position of the log within its block, when known.
    pub log_index: Option<u64>,
    /// The emitting contract address.
    pub address: Address,
    /// The owning contract record.
    pub contract: Contract,
    /// The resolved event name, absent when no signature matched.
    pub name: Option<String>,
    /// The resolved canonical event signature, absent when no signature
    /// matched.
    pub signature: Option<String>,
    /// The event's typed inputs, empty when unresolved.
    pub inputs: Vec<EventParam>,
    /// Decoded parameters paired with their names, empty when unresolved.
    pub params: Vec<(String, DynSolValue)>,
    /// True when the log's signature topic is a known transfer event.
    pub is_transfer: bool,
    /// The raw log.
    pub raw: Log,
}

/// Decodes logs with the contract ABI when available and the signature
/// registry plus remote resolver as fallback, and derives transfer records
/// from transaction log batches.
pub struct LogDecoder {
    contracts: Arc<ContractService>,
    registry: Arc<SignatureRegistry>,
    signature_source: Arc<dyn SignatureSource>,
    emit_nft_transfers: bool,
}

impl LogDecoder {
    /// Creates a decoder over the shared contract service, registry, and
    /// resolver. With `emit_nft_transfers`, transfer extraction also covers
    /// erc721/erc1155 tagged contracts.
    pub fn new(
        contracts: Arc<ContractService>,
        registry: Arc<SignatureRegistry>,
        signature_source: Arc<dyn SignatureSource>,
        emit_nft_transfers: bool,
    ) -> Self {
        Self { contracts, registry, signature_source, emit_nft_transfers }
    }

    /// Decodes one event log. Never fails: a log whose signature cannot be
    /// resolved is returned with only the raw fields populated.
    pub async fn decode_log(&self, log: &Log, contract: &Contract) -> DecodedLog {
        let mut decoded = DecodedLog {
            log_index: log.log_index(),
            address: log.address(),
            contract: contract.clone(),
            name: None,
            signature: None,
            inputs: Vec::new(),
            params: Vec::new(),
            is_transfer: log.topic0().is_some_and(is_transfer_topic),
            raw: log.clone(),
        };
        let Some(topic0) = log.topic0() else {
            // Anonymous logs carry no signature topic to resolve.
            return decoded;
        };

        // Exact path: the contract's own ABI.
        if let Some(event) = find_event(contract, topic0) {
            match decode_event_params(&event, log) {
                Ok(params) => {
                    fill_decoded(&mut decoded, DecodeStrategy::ExactAbi(event), params);
                    return decoded;
                }
                Err(e) => {
                    tracing::debug!(
                        address = %log.address(),
                        error = %e,
                        "Failed to decode log with contract ABI."
                    );
                }
            }
        }

        // Inferred path: registry first, remote resolver second.
        if let Some(event) = self.inferred_event(topic0, log.topics().len()).await {
            match decode_event_params(&event, log) {
                Ok(params) => {
                    fill_decoded(&mut decoded, DecodeStrategy::InferredSignature(event), params);
                    return decoded;
                }
                Err(e) => {
                    tracing::debug!(
                        address = %log.address(),
                        error = %e,
                        "Failed to decode log with inferred signature."
                    );
                }
            }
        }

        decoded
    }

    /// Derives the transfer list of a transaction from its raw logs.
    ///
    /// Each log with a known transfer topic is resolved to its owning
    /// contract; erc20-tagged contracts yield a record (plus erc721/erc1155
    /// when configured). Results are sorted ascending by log index
    /// regardless of the completion order of the contract lookups.
    pub async fn extract_transfers(&self, tx: &RawTransaction) -> Vec<Transfer> {
        let mut transfers = Vec::new();

        for log in tx.parsed_logs() {
            let Some(topic0) = log.topic0() else { continue };
            if !is_transfer_topic(topic0) {
                continue;
            }
            let Some(contract) = self.contracts.get_contract(log.address).await else {
                continue;
            };
            if !self.emits_transfers_for(&contract) {
                continue;
            }
            if log.topics.len() < 3 {
                tracing::debug!(
                    address = %log.address,
                    log_index = log.log_index,
                    "Transfer log is missing account topics."
                );
                continue;
            }

            transfers.push(Transfer {
                log_index: log.log_index,
                address: contract.address,
                value: log.data.clone(),
                decimals: contract.decimals(),
                to: address_from_topic(&log.topics[1]),
                from: address_from_topic(&log.topics[2]),
                symbol: contract.symbol(),
            });
        }

        // Downstream consumers reconstruct balance deltas in emission order.
        transfers.sort_by_key(|transfer| transfer.log_index);
        transfers
    }

    fn emits_transfers_for(&self, contract: &Contract) -> bool {
        contract.supports(TokenStandard::Erc20)
            || (self.emit_nft_transfers
                && (contract.supports(TokenStandard::Erc721)
                    || contract.supports(TokenStandard::Erc1155)))
    }

    /// Resolves an event fragment from signature text: registry hit, or a
    /// remote lookup recorded into the registry on success.
    ///
    /// Signature text carries no `indexed` markers, so the leading
    /// parameters are assumed to fill the log's remaining topics; a wrong
    /// assumption surfaces as a decode error and degrades to the raw log.
    async fn inferred_event(&self, topic: B256, topic_count: usize) -> Option<Event> {
        let signature = match self.registry.lookup_event(topic) {
            Some(signature) => signature,
            None => {
                let signature = match self.signature_source.event_signature(topic).await {
                    Ok(Some(signature)) => signature,
                    Ok(None) => {
                        tracing::info!(%topic, "No signature known for event topic.");
                        return None;
                    }
                    Err(e) => {
                        tracing::warn!(%topic, error = %e, "Signature lookup failed.");
                        return None;
                    }
                };
                self.registry.record_event(topic, &signature);
                signature
            }
        };

        let mut event = match Event::parse(&signature) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(%topic, signature, error = %e, "Signature text does not parse.");
                return None;
            }
        };

        let indexed = topic_count.saturating_sub(1);
        if event.inputs.iter().all(|input| !input.indexed) && indexed <= event.inputs.len() {
            for input in event.inputs.iter_mut().take(indexed) {
                input.indexed = true;
            }
        }
        Some(event)
    }
}

/// Classifies the token standard a transfer log belongs to: erc1155 on the
/// dedicated signatures, else erc721 on four topics, else erc20.
pub fn token_type_from_log(log: &Log) -> TokenStandard {
    let topic0 = log.topic0();
    if topic0 == Some(ERC1155_TRANSFER_SINGLE_TOPIC)
        || topic0 == Some(ERC1155_TRANSFER_BATCH_TOPIC)
    {
        TokenStandard::Erc1155
    } else if log.topics().len() == 4 {
        TokenStandard::Erc721
    } else {
        TokenStandard::Erc20
    }
}

fn fill_decoded(
    decoded: &mut DecodedLog,
    strategy: DecodeStrategy<Event>,
    params: Vec<(String, DynSolValue)>,
) {
    let event = strategy.fragment();
    decoded.name = Some(event.name.clone());
    decoded.signature = Some(event.signature());
    decoded.inputs = event.inputs.clone();
    decoded.params = params;
}

/// Decodes a log's topics and data against an event definition, pairing
/// values with parameter names. Indexed parameters come first in the event
/// definitions this decoder produces.
fn decode_event_params(
    event: &Event,
    log: &Log,
) -> Result<Vec<(String, DynSolValue)>, dyn_abi::Error> {
    let decoded = event.decode_log_parts(log.topics().iter().copied(), log.data().as_ref())?;

    Ok(event
        .inputs
        .iter()
        .map(|input| input.name.clone())
        .zip(decoded.indexed.into_iter().chain(decoded.body))
        .collect())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Bytes, U256, address, b256};

    use super::*;
    use crate::{
        models::RawLogs,
        signatures::TRANSFER_TOPIC,
        test_helpers::{
            RawLogBuilder, StaticSignatureSource, create_test_log_decoder,
            create_test_log_decoder_with_contracts, erc20_contract, erc20_raw_contract,
            unverified_contract,
        },
    };

    const TOKEN: Address = address!("2222222222222222222222222222222222222222");
    const ALICE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const BOB: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    fn transfer_raw_log(log_index: u64) -> crate::models::RawLog {
        RawLogBuilder::new()
            .address(TOKEN)
            .topic(TRANSFER_TOPIC)
            .topic(ALICE.into_word())
            .topic(BOB.into_word())
            .data(Bytes::from(U256::from(1000).to_be_bytes::<32>().to_vec()))
            .log_index(log_index)
            .build()
    }

    #[tokio::test]
    async fn test_decode_log_with_contract_abi() {
        let decoder = create_test_log_decoder(
            Arc::new(SignatureRegistry::new()),
            Arc::new(StaticSignatureSource::empty()),
        );
        let contract = erc20_contract(TOKEN);
        let log = Log::from(&transfer_raw_log(0));

        let decoded = decoder.decode_log(&log, &contract).await;

        assert_eq!(decoded.name.as_deref(), Some("Transfer"));
        assert_eq!(
            decoded.signature.as_deref(),
            Some("Transfer(address,address,uint256)")
        );
        assert!(decoded.is_transfer);
        assert_eq!(decoded.params.len(), 3);
        assert_eq!(decoded.params[0].1, DynSolValue::Address(ALICE));
        assert_eq!(decoded.params[1].1, DynSolValue::Address(BOB));
        assert_eq!(decoded.params[2].1, DynSolValue::Uint(U256::from(1000), 256));
        assert_eq!(decoded.inputs.len(), 3);
    }

    #[tokio::test]
    async fn test_decode_log_via_registry_for_unverified_contract() {
        let decoder = create_test_log_decoder(
            Arc::new(SignatureRegistry::new()),
            Arc::new(StaticSignatureSource::empty()),
        );
        let contract = unverified_contract(TOKEN);
        let log = Log::from(&transfer_raw_log(0));

        let decoded = decoder.decode_log(&log, &contract).await;

        // Resolved through the static override table, with inferred indexed
        // placement.
        assert_eq!(decoded.name.as_deref(), Some("Transfer"));
        assert_eq!(decoded.params.len(), 3);
        assert_eq!(decoded.params[0].1, DynSolValue::Address(ALICE));
    }

    #[tokio::test]
    async fn test_decode_log_unresolvable_keeps_raw_fields() {
        let decoder = create_test_log_decoder(
            Arc::new(SignatureRegistry::new()),
            Arc::new(StaticSignatureSource::empty()),
        );
        let contract = unverified_contract(TOKEN);
        let log = Log::from(
            &RawLogBuilder::new()
                .address(TOKEN)
                .topic(b256!("1234123412341234123412341234123412341234123412341234123412341234"))
                .log_index(3)
                .build(),
        );

        let decoded = decoder.decode_log(&log, &contract).await;

        assert!(decoded.name.is_none());
        assert!(decoded.params.is_empty());
        assert!(!decoded.is_transfer);
        assert_eq!(decoded.log_index, Some(3));
        assert_eq!(decoded.address, TOKEN);
    }

    #[tokio::test]
    async fn test_decode_log_without_topics_keeps_raw_fields() {
        let decoder = create_test_log_decoder(
            Arc::new(SignatureRegistry::new()),
            Arc::new(StaticSignatureSource::empty()),
        );
        let contract = unverified_contract(TOKEN);
        let log = Log::from(&RawLogBuilder::new().address(TOKEN).build());

        let decoded = decoder.decode_log(&log, &contract).await;
        assert!(decoded.name.is_none());
        assert!(!decoded.is_transfer);
    }

    #[tokio::test]
    async fn test_extract_transfers_sorted_by_log_index() {
        let decoder =
            create_test_log_decoder_with_contracts(vec![erc20_raw_contract(TOKEN)], false);

        let tx = RawTransaction {
            logs: Some(RawLogs::Parsed(vec![transfer_raw_log(5), transfer_raw_log(2)])),
            ..Default::default()
        };

        let transfers = decoder.extract_transfers(&tx).await;

        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].log_index, 2);
        assert_eq!(transfers[1].log_index, 5);
        assert_eq!(transfers[0].to, ALICE);
        assert_eq!(transfers[0].from, BOB);
        assert_eq!(transfers[0].symbol.as_deref(), Some("EXM"));
        assert_eq!(transfers[0].decimals, Some(18));
        assert_eq!(
            transfers[0].value,
            Bytes::from(U256::from(1000).to_be_bytes::<32>().to_vec())
        );
    }

    #[tokio::test]
    async fn test_extract_transfers_skips_non_erc20_contracts() {
        let mut raw = erc20_raw_contract(TOKEN);
        raw.supported_interfaces = vec!["erc721".into()];
        let decoder = create_test_log_decoder_with_contracts(vec![raw], false);

        let tx = RawTransaction {
            logs: Some(RawLogs::Parsed(vec![transfer_raw_log(0)])),
            ..Default::default()
        };

        assert!(decoder.extract_transfers(&tx).await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_transfers_emits_nft_transfers_when_configured() {
        let mut raw = erc20_raw_contract(TOKEN);
        raw.supported_interfaces = vec!["erc721".into()];
        raw.calldata = None;
        let decoder = create_test_log_decoder_with_contracts(vec![raw], true);

        let tx = RawTransaction {
            logs: Some(RawLogs::Parsed(vec![transfer_raw_log(0)])),
            ..Default::default()
        };

        let transfers = decoder.extract_transfers(&tx).await;
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].decimals, None);
    }

    #[tokio::test]
    async fn test_extract_transfers_skips_unknown_contracts() {
        let decoder = create_test_log_decoder_with_contracts(vec![], false);

        let tx = RawTransaction {
            logs: Some(RawLogs::Parsed(vec![transfer_raw_log(0)])),
            ..Default::default()
        };

        assert!(decoder.extract_transfers(&tx).await.is_empty());
    }

    #[tokio::test]
    async fn test_extract_transfers_parses_encoded_logs() {
        let decoder =
            create_test_log_decoder_with_contracts(vec![erc20_raw_contract(TOKEN)], false);

        let logs = serde_json::to_string(&vec![transfer_raw_log(1)]).unwrap();
        let tx = RawTransaction {
            logs: Some(RawLogs::Encoded(logs)),
            ..Default::default()
        };

        assert_eq!(decoder.extract_transfers(&tx).await.len(), 1);
    }

    #[test]
    fn test_token_type_from_log() {
        let erc20 = Log::from(&transfer_raw_log(0));
        assert_eq!(token_type_from_log(&erc20), TokenStandard::Erc20);

        let erc721 = Log::from(
            &RawLogBuilder::new()
                .address(TOKEN)
                .topic(TRANSFER_TOPIC)
                .topic(ALICE.into_word())
                .topic(BOB.into_word())
                .topic(U256::from(7).into())
                .build(),
        );
        assert_eq!(token_type_from_log(&erc721), TokenStandard::Erc721);

        let erc1155 = Log::from(
            &RawLogBuilder::new()
                .address(TOKEN)
                .topic(ERC1155_TRANSFER_SINGLE_TOPIC)
                .topic(ALICE.into_word())
                .topic(ALICE.into_word())
                .topic(BOB.into_word())
                .build(),
        );
        assert_eq!(token_type_from_log(&erc1155), TokenStandard::Erc1155);
    }
}
