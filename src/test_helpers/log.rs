//! A builder for creating raw log payloads for testing.

use alloy::primitives::{Address, B256, Bytes};

use crate::models::RawLog;

/// A builder for creating [`RawLog`] instances for testing. The common log
/// type is reached through `Log::from(&raw_log)`.
#[derive(Debug, Clone, Default)]
pub struct RawLogBuilder {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    log_index: u64,
}

impl RawLogBuilder {
    /// Creates a new `RawLogBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address of the contract that emitted the log.
    pub fn address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Adds a topic to the log.
    pub fn topic(mut self, topic: B256) -> Self {
        self.topics.push(topic);
        self
    }

    /// Sets the topics of the log.
    pub fn topics(mut self, topics: Vec<B256>) -> Self {
        self.topics = topics;
        self
    }

    /// Sets the data of the log.
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Sets the log index.
    pub fn log_index(mut self, log_index: u64) -> Self {
        self.log_index = log_index;
        self
    }

    /// Builds the `RawLog` with the provided values.
    pub fn build(self) -> RawLog {
        RawLog {
            address: self.address,
            topics: self.topics,
            data: self.data,
            log_index: self.log_index,
        }
    }
}
