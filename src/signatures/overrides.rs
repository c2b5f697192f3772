//! Static signature override tables.
//!
//! These cover the token-standard surface that dominates decoded traffic,
//! so the common selectors never hit the remote signature service. They are
//! seeded into the registry at construction and are never evicted.

use alloy::primitives::{B256, Selector, b256, fixed_bytes};

/// Function selector overrides.
pub(crate) const FUNCTION_OVERRIDES: &[(Selector, &str)] = &[
    // erc20
    (fixed_bytes!("0x06fdde03"), "name()"),
    (fixed_bytes!("0x95d89b41"), "symbol()"),
    (fixed_bytes!("0x313ce567"), "decimals()"),
    (fixed_bytes!("0x18160ddd"), "totalSupply()"),
    (fixed_bytes!("0x70a08231"), "balanceOf(address)"),
    (fixed_bytes!("0xa9059cbb"), "transfer(address,uint256)"),
    (fixed_bytes!("0x23b872dd"), "transferFrom(address,address,uint256)"),
    (fixed_bytes!("0x095ea7b3"), "approve(address,uint256)"),
    (fixed_bytes!("0xdd62ed3e"), "allowance(address,address)"),
    // wrapped-native
    (fixed_bytes!("0xd0e30db0"), "deposit()"),
    (fixed_bytes!("0x2e1a7d4d"), "withdraw(uint256)"),
    // erc721
    (fixed_bytes!("0x42842e0e"), "safeTransferFrom(address,address,uint256)"),
    (fixed_bytes!("0xb88d4fde"), "safeTransferFrom(address,address,uint256,bytes)"),
    (fixed_bytes!("0x081812fc"), "getApproved(uint256)"),
    (fixed_bytes!("0xa22cb465"), "setApprovalForAll(address,bool)"),
    (fixed_bytes!("0xe985e9c5"), "isApprovedForAll(address,address)"),
    (fixed_bytes!("0x6352211e"), "ownerOf(uint256)"),
    (fixed_bytes!("0xc87b56dd"), "tokenURI(uint256)"),
    // erc1155
    (fixed_bytes!("0x00fdd58e"), "balanceOf(address,uint256)"),
    (fixed_bytes!("0xf242432a"), "safeTransferFrom(address,address,uint256,uint256,bytes)"),
    (
        fixed_bytes!("0x2eb2c2d6"),
        "safeBatchTransferFrom(address,address,uint256[],uint256[],bytes)",
    ),
    (fixed_bytes!("0x0e89341c"), "uri(uint256)"),
];

/// Event topic overrides.
pub(crate) const EVENT_OVERRIDES: &[(B256, &str)] = &[
    (
        b256!("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
        "Transfer(address,address,uint256)",
    ),
    (
        b256!("0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"),
        "Approval(address,address,uint256)",
    ),
    (
        b256!("0x17307eab39ab6107e8899845ad3d59bd9653f200f220920489ca2b5937696c31"),
        "ApprovalForAll(address,address,bool)",
    ),
    (
        b256!("0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62"),
        "TransferSingle(address,address,address,uint256,uint256)",
    ),
    (
        b256!("0x4a39dc06d4c0dbc64b70af90fd698a233a518aa5d07e595d983b8c0526c8f7fb"),
        "TransferBatch(address,address,address,uint256[],uint256[])",
    ),
    (
        b256!("0x6bb7ff708619ba0610cba295a58592e0451dee2622938c8755667688daf3529b"),
        "URI(string,uint256)",
    ),
    (
        b256!("0xe1fffcc4923d04b559f4d29a8bfc6cda04eb5b0d3c460751c2402c5c5cc9109c"),
        "Deposit(address,uint256)",
    ),
    (
        b256!("0x7fcf532c15f0a6db0bd6d0e038bea71d30d808c7d98cb3bf7268a95bf5081b65"),
        "Withdrawal(address,uint256)",
    ),
    (
        b256!("0x8be0079c531659141344cd1fd0a4f28419497f9722a3daafe3b4186f6b6457e0"),
        "OwnershipTransferred(address,address)",
    ),
];
