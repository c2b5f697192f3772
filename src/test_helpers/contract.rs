//! Canned contracts and calldata for testing.

use alloy::primitives::{Address, Bytes, U256, fixed_bytes};

use super::abi::erc20_abi_json;
use crate::{
    contracts::ContractFactory,
    models::{Contract, RawContract},
};

/// A raw indexer payload for a verified erc20 token at `address`.
pub fn erc20_raw_contract(address: Address) -> RawContract {
    RawContract {
        address,
        name: Some("Example Token".into()),
        supported_interfaces: vec!["erc20".into()],
        calldata: Some(r#"{"name": "Example Token", "symbol": "EXM", "decimals": 18}"#.into()),
        metadata: Some(serde_json::from_str(erc20_abi_json()).expect("erc20 fixture parses")),
        ..Default::default()
    }
}

/// A built, verified erc20 contract at `address`.
pub fn erc20_contract(address: Address) -> Contract {
    ContractFactory::new().build(erc20_raw_contract(address))
}

/// A built placeholder record for an address nothing is known about.
pub fn unverified_contract(address: Address) -> Contract {
    ContractFactory::new().build_empty(address)
}

/// Calldata for `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: u64) -> Bytes {
    let mut input = fixed_bytes!("0xa9059cbb").to_vec();
    input.extend_from_slice(&[0u8; 12]);
    input.extend_from_slice(to.as_slice());
    input.extend_from_slice(&U256::from(amount).to_be_bytes::<32>());
    Bytes::from(input)
}
