//! A set of helpers for testing

mod abi;
mod contract;
mod decoder;
mod http_client;
mod log;
mod stubs;

pub use abi::{erc20_abi, erc20_abi_json, single_function_abi};
pub use contract::{erc20_contract, erc20_raw_contract, transfer_calldata, unverified_contract};
pub use decoder::{create_test_log_decoder, create_test_log_decoder_with_contracts};
pub use http_client::create_test_http_client;
pub use log::RawLogBuilder;
pub use stubs::{
    StaticIndexer, StaticNftSource, StaticSignatureSource, StaticVerifiedStore,
    create_test_contract_service, create_test_list_client,
};
