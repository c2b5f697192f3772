//! Data models for Rosetta.

pub mod contract;
pub mod log;
pub mod raw;
pub mod transfer;

pub use contract::{Contract, CreationInfo, Nft, TokenStandard};
pub use log::Log;
pub use raw::{RawContract, RawLog, RawLogs, RawTransaction};
pub use transfer::Transfer;
