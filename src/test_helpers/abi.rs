//! Canned ABIs for testing.

use alloy::json_abi::JsonAbi;

/// The full erc20 ABI fixture.
pub fn erc20_abi_json() -> &'static str {
    include_str!("../../abis/erc20.json")
}

/// The parsed erc20 ABI fixture.
pub fn erc20_abi() -> JsonAbi {
    serde_json::from_str(erc20_abi_json()).expect("erc20 fixture parses")
}

/// A one-fragment ABI, useful for exercising the cache merge rule.
pub fn single_function_abi() -> JsonAbi {
    serde_json::from_str(
        r#"[
            {
                "type": "function",
                "name": "deposit",
                "inputs": [],
                "outputs": []
            }
        ]"#,
    )
    .expect("single-function fixture parses")
}
