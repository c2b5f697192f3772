//! Configuration module for Rosetta.

mod app_config;
mod helpers;
mod http_base;
mod http_retry;
mod rpc_retry;

pub use app_config::AppConfig;
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_urls,
    serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use rpc_retry::RpcRetryConfig;
