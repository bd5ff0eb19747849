//! Configuration for the transaction dashboard

pub mod rpc;

use crate::{Error, Result};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Contract address environment variable name
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";

/// Private key environment variable name
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain the dashboard operates on
    pub chain_id: u64,
    /// Address of the deployed Transactions contract
    pub contract_address: Option<String>,
    /// Interval for polling the provider chain id (milliseconds)
    pub chain_poll_interval_ms: u64,
    /// Path of the advisory transaction-count cache
    pub count_cache_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Local dev node by default; point chain_id at a public network
            // for real deployments
            chain_id: rpc::chains::LOCAL,
            contract_address: None,
            chain_poll_interval_ms: 15_000,
            count_cache_path: "transaction-count.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Apply environment overrides (CONTRACT_ADDRESS)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(address) = std::env::var(CONTRACT_ADDRESS_ENV) {
            tracing::debug!("Using CONTRACT_ADDRESS from environment");
            self.contract_address = Some(address);
        }
        self
    }

    /// Parsed contract address; fails when unset or malformed
    pub fn contract_address(&self) -> Result<Address> {
        let raw = self.contract_address.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "contract address not configured; set it in the config file or {}",
                CONTRACT_ADDRESS_ENV
            ))
        })?;
        Address::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid contract address {}: {}", raw, e)))
    }
}
