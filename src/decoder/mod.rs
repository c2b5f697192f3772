//! Two-tier decoders for calldata and event logs: exact decoding against
//! the contract's own ABI, with an inferred-signature fallback through the
//! signature registry and the remote signature database.

mod calldata;
mod log;

use alloy::{
    json_abi::{Event, Function},
    primitives::{B256, Selector},
};

pub use calldata::{CalldataDecoder, DecodedCall};
pub use log::{DecodedLog, LogDecoder, token_type_from_log};

use crate::models::Contract;

/// How a payload is decoded, selected once per decode call.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStrategy<F> {
    /// The fragment comes from the owning contract's ABI.
    ExactAbi(F),
    /// The fragment was built from registry or remote signature text alone.
    InferredSignature(F),
}

impl<F> DecodeStrategy<F> {
    /// The fragment this strategy decodes with.
    pub fn fragment(&self) -> &F {
        match self {
            Self::ExactAbi(fragment) | Self::InferredSignature(fragment) => fragment,
        }
    }

    /// True when the fragment was inferred from signature text rather than
    /// taken from the contract's ABI.
    pub fn is_inferred(&self) -> bool {
        matches!(self, Self::InferredSignature(_))
    }
}

/// Finds the ABI function matching a calldata selector.
pub(crate) fn find_function(contract: &Contract, selector: Selector) -> Option<Function> {
    contract
        .abi
        .as_ref()?
        .functions()
        .find(|function| function.selector() == selector)
        .cloned()
}

/// Finds the ABI event matching a log's signature topic.
pub(crate) fn find_event(contract: &Contract, topic: B256) -> Option<Event> {
    contract.abi.as_ref()?.events().find(|event| event.selector() == topic).cloned()
}
