//! Test helpers for wiring decoders.

use std::sync::Arc;

use super::stubs::{StaticSignatureSource, create_test_contract_service};
use crate::{
    decoder::LogDecoder,
    models::RawContract,
    signatures::{SignatureRegistry, SignatureSource},
};

/// Creates a `LogDecoder` over an empty contract service, for tests that
/// decode single logs against explicit contracts.
pub fn create_test_log_decoder(
    registry: Arc<SignatureRegistry>,
    signature_source: Arc<dyn SignatureSource>,
) -> Arc<LogDecoder> {
    Arc::new(LogDecoder::new(
        create_test_contract_service(Vec::new()),
        registry,
        signature_source,
        false,
    ))
}

/// Creates a `LogDecoder` whose contract service resolves the given
/// records, for transfer-extraction tests.
pub fn create_test_log_decoder_with_contracts(
    contracts: Vec<RawContract>,
    emit_nft_transfers: bool,
) -> Arc<LogDecoder> {
    Arc::new(LogDecoder::new(
        create_test_contract_service(contracts),
        Arc::new(SignatureRegistry::new()),
        Arc::new(StaticSignatureSource::empty()),
        emit_nft_transfers,
    ))
}
