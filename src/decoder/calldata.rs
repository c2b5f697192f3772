//! Decodes transaction input data into structured calls.

use std::sync::Arc;

use alloy::{
    dyn_abi::{self, DynSolType, DynSolValue},
    json_abi::Function,
    primitives::Selector,
};

use super::{DecodeStrategy, LogDecoder, find_function};
use crate::{
    models::{Contract, RawTransaction, Transfer},
    signatures::{SignatureRegistry, SignatureSource},
};

/// A decoded function call.
#[derive(Debug, Clone)]
pub struct DecodedCall {
    /// The function name.
    pub name: String,
    /// The canonical function signature.
    pub signature: String,
    /// The 4-byte selector the call was matched by.
    pub selector: Selector,
    /// Decoded arguments, paired with their parameter names. Parameters of
    /// inferred signatures carry empty names.
    pub args: Vec<(String, DynSolValue)>,
    /// True when the call was decoded from signature text rather than the
    /// contract's ABI.
    pub inferred: bool,
    /// Asset transfers from the transaction's logs, when requested.
    pub transfers: Option<Vec<Transfer>>,
}

/// Decodes calldata with the contract ABI when available and the signature
/// registry plus remote resolver as fallback.
pub struct CalldataDecoder {
    registry: Arc<SignatureRegistry>,
    signature_source: Arc<dyn SignatureSource>,
    log_decoder: Arc<LogDecoder>,
}

impl CalldataDecoder {
    /// Creates a decoder over the shared registry, resolver, and log
    /// decoder.
    pub fn new(
        registry: Arc<SignatureRegistry>,
        signature_source: Arc<dyn SignatureSource>,
        log_decoder: Arc<LogDecoder>,
    ) -> Self {
        Self { registry, signature_source, log_decoder }
    }

    /// Decodes a transaction's input data into a structured call.
    ///
    /// Returns `None` when there is nothing to decode (empty input,
    /// unresolved contract) or when no signature can be resolved; it never
    /// errors. With `include_transfers`, the transaction's transfer list is
    /// attached to the result.
    pub async fn decode_call(
        &self,
        tx: &RawTransaction,
        contract: Option<&Contract>,
        include_transfers: bool,
    ) -> Option<DecodedCall> {
        let contract = contract?;
        let input = tx.input.as_ref()?;
        if input.len() < 4 {
            return None;
        }
        let selector = Selector::from_slice(&input[..4]);
        let data = &input[4..];

        // Exact path: the contract's own ABI. Decode failures here are
        // common with unverified and partial ABIs, so they fall through to
        // the inferred path rather than ending the decode.
        if let Some(function) = find_function(contract, selector) {
            match decode_args(&function, data) {
                Ok(args) => {
                    let strategy = DecodeStrategy::ExactAbi(function);
                    return Some(self.build_call(strategy, selector, args, tx, include_transfers).await);
                }
                Err(e) => {
                    tracing::debug!(
                        address = %contract.address,
                        %selector,
                        error = %e,
                        "Failed to decode input with contract ABI."
                    );
                }
            }
        }

        // Inferred path: registry first, remote resolver second.
        let function = self.inferred_function(selector).await?;
        match decode_args(&function, data) {
            Ok(args) => {
                let strategy = DecodeStrategy::InferredSignature(function);
                Some(self.build_call(strategy, selector, args, tx, include_transfers).await)
            }
            Err(e) => {
                tracing::info!(
                    address = %contract.address,
                    %selector,
                    error = %e,
                    "Failed to decode input with inferred signature."
                );
                None
            }
        }
    }

    async fn build_call(
        &self,
        strategy: DecodeStrategy<Function>,
        selector: Selector,
        args: Vec<(String, DynSolValue)>,
        tx: &RawTransaction,
        include_transfers: bool,
    ) -> DecodedCall {
        let transfers = if include_transfers {
            Some(self.log_decoder.extract_transfers(tx).await)
        } else {
            None
        };
        let function = strategy.fragment();
        DecodedCall {
            name: function.name.clone(),
            signature: function.signature(),
            selector,
            args,
            inferred: strategy.is_inferred(),
            transfers,
        }
    }

    /// Resolves a function fragment from signature text: registry hit, or a
    /// remote lookup recorded into the registry on success. A remote miss
    /// records nothing.
    async fn inferred_function(&self, selector: Selector) -> Option<Function> {
        let signature = match self.registry.lookup_function(selector) {
            Some(signature) => signature,
            None => {
                let signature = match self.signature_source.function_signature(selector).await {
                    Ok(Some(signature)) => signature,
                    Ok(None) => {
                        tracing::info!(%selector, "No signature known for function selector.");
                        return None;
                    }
                    Err(e) => {
                        tracing::warn!(%selector, error = %e, "Signature lookup failed.");
                        return None;
                    }
                };
                self.registry.record_function(selector, &signature);
                signature
            }
        };

        match Function::parse(&signature) {
            Ok(function) => Some(function),
            Err(e) => {
                tracing::warn!(%selector, signature, error = %e, "Signature text does not parse.");
                None
            }
        }
    }
}

/// Decodes the argument tuple of `function` from calldata past the
/// selector.
fn decode_args(
    function: &Function,
    data: &[u8],
) -> Result<Vec<(String, DynSolValue)>, dyn_abi::Error> {
    let input_types: Vec<DynSolType> = function
        .inputs
        .iter()
        .map(|param| param.ty.parse())
        .collect::<Result<Vec<_>, _>>()?;

    let tuple_type = DynSolType::Tuple(input_types);
    let decoded = tuple_type.abi_decode(data)?;

    let DynSolValue::Tuple(values) = decoded else {
        return Err(dyn_abi::Error::TypeMismatch {
            expected: tuple_type.to_string(),
            actual: format!("{decoded:?}"),
        });
    };

    Ok(function
        .inputs
        .iter()
        .map(|param| param.name.clone())
        .zip(values)
        .collect())
}
