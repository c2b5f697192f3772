//! EVM log data structures.

use alloy::{
    primitives::{Address, B256, Bytes, LogData},
    rpc::types::Log as AlloyLog,
};
use serde::{Deserialize, Serialize};

use super::raw::RawLog;

/// A newtype wrapper around `alloy::rpc::types::Log` to create a stable
/// API boundary for the rest of the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Log(pub AlloyLog);

impl Log {
    /// Returns the address of the contract that emitted the log.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Returns the topics of the log.
    pub fn topics(&self) -> &[B256] {
        self.0.topics()
    }

    /// Returns the first topic (the event-signature hash), if any.
    pub fn topic0(&self) -> Option<B256> {
        self.topics().first().copied()
    }

    /// Returns the data of the log.
    pub fn data(&self) -> &Bytes {
        &self.0.data().data
    }

    /// Returns the index of the log in the block, or `None` if it's pending.
    pub fn log_index(&self) -> Option<u64> {
        self.0.log_index
    }

    /// Returns the hash of the transaction that generated the log, or `None`
    /// if it's pending.
    pub fn transaction_hash(&self) -> Option<B256> {
        self.0.transaction_hash
    }
}

/// The conversion from the alloy type to our custom type is a zero-cost move.
impl From<AlloyLog> for Log {
    fn from(log: AlloyLog) -> Self {
        Self(log)
    }
}

/// Lifts an indexer log payload into the common log type.
impl From<&RawLog> for Log {
    fn from(raw: &RawLog) -> Self {
        Self(AlloyLog {
            inner: alloy::primitives::Log {
                address: raw.address,
                data: LogData::new_unchecked(raw.topics.clone(), raw.data.clone()),
            },
            log_index: Some(raw.log_index),
            ..Default::default()
        })
    }
}
