#![warn(missing_docs)]
//! Rosetta resolves, caches, and decodes smart-contract metadata and
//! ABI-encoded payloads (function calls, event logs) for EVM-style chains.

pub mod config;
pub mod contracts;
pub mod decoder;
pub mod http_client;
pub mod models;
pub mod providers;
pub mod signatures;
pub mod test_helpers;
