use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{BaseHttpClientConfig, HttpRetryConfig, RpcRetryConfig, deserialize_urls};

/// Application configuration for Rosetta.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Chain identifier used to filter the token-list and
    /// system-contract-list documents after fetch.
    pub chain_id: u64,

    /// RPC URLs for the EVM node, used only for last-resort NFT reads.
    #[serde(deserialize_with = "deserialize_urls")]
    pub rpc_urls: Vec<Url>,

    /// Base URL of the indexer HTTP API.
    pub indexer_url: Url,

    /// Base URL of the verified-contract object store.
    pub verified_contracts_url: Url,

    /// Base URL of the public signature-lookup service.
    pub signature_api_url: Url,

    /// URL of the public token-list document.
    pub token_list_url: Url,

    /// URL of the public system-contract-list document.
    pub system_contract_list_url: Url,

    /// Whether transfer extraction also emits records for erc721/erc1155
    /// tagged contracts. Off by default: only erc20 transfers are reported.
    #[serde(default)]
    pub emit_nft_transfers: bool,

    /// Optional RPC retry configuration.
    #[serde(default)]
    pub rpc_retry_config: RpcRetryConfig,

    /// Configuration for HTTP client retry policies.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("ROSETTA").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain_id: 40,
            rpc_urls: vec![],
            indexer_url: Url::parse("http://localhost:8080").expect("static url"),
            verified_contracts_url: Url::parse("http://localhost:9000").expect("static url"),
            signature_api_url: Url::parse("http://localhost:7000").expect("static url"),
            token_list_url: Url::parse("http://localhost:7100/tokenlist.json")
                .expect("static url"),
            system_contract_list_url: Url::parse("http://localhost:7100/systemcontractlist.json")
                .expect("static url"),
            emit_nft_transfers: false,
            rpc_retry_config: RpcRetryConfig::default(),
            http_retry_config: HttpRetryConfig::default(),
            http_base_config: BaseHttpClientConfig::default(),
        }
    }
}

/// A builder for creating `AppConfig` instances, mainly for tests and
/// embedding callers that do not read a config directory.
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Sets the chain identifier.
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    /// Sets the RPC URLs.
    pub fn rpc_urls(mut self, rpc_urls: Vec<Url>) -> Self {
        self.config.rpc_urls = rpc_urls;
        self
    }

    /// Sets the indexer base URL.
    pub fn indexer_url(mut self, url: &str) -> Self {
        self.config.indexer_url = Url::parse(url).expect("invalid indexer url");
        self
    }

    /// Sets the verified-contract store base URL.
    pub fn verified_contracts_url(mut self, url: &str) -> Self {
        self.config.verified_contracts_url = Url::parse(url).expect("invalid store url");
        self
    }

    /// Sets the signature-lookup service base URL.
    pub fn signature_api_url(mut self, url: &str) -> Self {
        self.config.signature_api_url = Url::parse(url).expect("invalid signature api url");
        self
    }

    /// Sets the token-list document URL.
    pub fn token_list_url(mut self, url: &str) -> Self {
        self.config.token_list_url = Url::parse(url).expect("invalid token list url");
        self
    }

    /// Sets the system-contract-list document URL.
    pub fn system_contract_list_url(mut self, url: &str) -> Self {
        self.config.system_contract_list_url = Url::parse(url).expect("invalid list url");
        self
    }

    /// Enables or disables NFT transfer emission.
    pub fn emit_nft_transfers(mut self, emit: bool) -> Self {
        self.config.emit_nft_transfers = emit;
        self
    }

    /// Builds the `AppConfig`.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_builder() {
        let config = AppConfig::builder()
            .chain_id(41)
            .indexer_url("http://indexer.test")
            .signature_api_url("http://sig.test")
            .emit_nft_transfers(true)
            .build();

        assert_eq!(config.chain_id, 41);
        assert_eq!(config.indexer_url.as_str(), "http://indexer.test/");
        assert_eq!(config.signature_api_url.as_str(), "http://sig.test/");
        assert!(config.emit_nft_transfers);
    }

    #[test]
    fn test_app_config_from_file() {
        let config_content = r#"
        chain_id: 40
        rpc_urls:
          - "http://localhost:8545"
        indexer_url: "https://api.example.net/v1"
        verified_contracts_url: "https://verified-contracts.example.net"
        signature_api_url: "https://api.example.net/v2/evm"
        token_list_url: "https://lists.example.net/tokenlist.json"
        system_contract_list_url: "https://lists.example.net/systemcontractlist.json"
        "#;
        let temp_dir = tempfile::tempdir().unwrap();
        let app_yaml_path = temp_dir.path().join("app.yaml");
        std::fs::write(&app_yaml_path, config_content).unwrap();

        let config = AppConfig::new(Some(temp_dir.path().to_str().unwrap())).unwrap();
        assert_eq!(config.chain_id, 40);
        assert_eq!(config.rpc_urls.len(), 1);
        assert!(!config.emit_nft_transfers);
        assert_eq!(config.http_retry_config.max_retries, 3);
    }
}
