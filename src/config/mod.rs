//! Configuration management for the flowrate client.
//!
//! Loads settings from environment variables and config files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Funding-rate endpoint and polling settings
    #[serde(default)]
    pub market_data: MarketDataConfig,
    /// Wallet session settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Typed-data signing schema and expiration horizon
    #[serde(default)]
    pub signing: SigningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Base URL of the exchange REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Markets to request funding rates for
    #[serde(default = "default_markets")]
    pub markets: Vec<String>,
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path to the SQLite database holding the reconnect flag
    #[serde(default = "default_flag_db_path")]
    pub flag_db_path: String,
    /// Ceiling for wallet enable / balance / sign calls, in seconds
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Typed-data domain name
    #[serde(default = "default_domain_name")]
    pub domain_name: String,
    /// Typed-data domain version
    #[serde(default = "default_domain_version")]
    pub domain_version: String,
    /// Chain identifier for the typed-data domain
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    /// Default order expiration horizon in seconds
    #[serde(default = "default_expiration_horizon_secs")]
    pub expiration_horizon_secs: i64,
}

// Default value functions

fn default_base_url() -> String {
    "https://api.starknet.sepolia.extended.exchange/api/v1".to_string()
}

fn default_markets() -> Vec<String> {
    vec!["ETH-USD".to_string(), "BTC-USD".to_string()]
}

fn default_poll_interval_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_flag_db_path() -> String {
    "data/session.db".to_string()
}

fn default_operation_timeout_secs() -> u64 {
    10
}

fn default_domain_name() -> String {
    "Perpetuals".to_string()
}

fn default_domain_version() -> String {
    "v0".to_string()
}

fn default_chain_id() -> String {
    "SN_SEPOLIA".to_string()
}

fn default_expiration_horizon_secs() -> i64 {
    3600
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("FLOWRATE"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.market_data.base_url.is_empty(),
            "market_data.base_url must not be empty"
        );

        anyhow::ensure!(
            !self.market_data.markets.is_empty(),
            "market_data.markets must list at least one market"
        );

        anyhow::ensure!(
            self.market_data.poll_interval_ms >= 1000,
            "market_data.poll_interval_ms must be at least 1000"
        );

        anyhow::ensure!(
            self.session.operation_timeout_secs >= 1,
            "session.operation_timeout_secs must be at least 1"
        );

        anyhow::ensure!(
            self.signing.expiration_horizon_secs > 0,
            "signing.expiration_horizon_secs must be positive"
        );

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market_data: MarketDataConfig::default(),
            session: SessionConfig::default(),
            signing: SigningConfig::default(),
        }
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            markets: default_markets(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flag_db_path: default_flag_db_path(),
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            domain_name: default_domain_name(),
            domain_version: default_domain_version(),
            chain_id: default_chain_id(),
            expiration_horizon_secs: default_expiration_horizon_secs(),
        }
    }
}
