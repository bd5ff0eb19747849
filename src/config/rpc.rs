//! RPC endpoint configuration
//!
//! Supports multiple configuration methods following Ethereum ecosystem
//! conventions:
//! 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - for testing only
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Per-chain URLs (recommended for production)
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//!
//! # Option 2: Single provider API key
//! export ALCHEMY_API_KEY="YOUR_KEY"
//!
//! # Option 3: No env vars - uses public RPCs (rate limited, for testing only)
//! ```

use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const HOLESKY: u64 = 17000;
    /// Hardhat / Anvil dev node
    pub const LOCAL: u64 = 31337;
}

/// Environment variable names
mod env_vars {
    // Per-chain URLs (highest priority)
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const HOLESKY_RPC_URL: &str = "HOLESKY_RPC_URL";
    pub const LOCAL_RPC_URL: &str = "LOCAL_RPC_URL";

    // Provider API keys
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const ETHEREUM: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://rpc.sepolia.org";
    pub const HOLESKY: &str = "https://ethereum-holesky-rpc.publicnode.com";
    pub const LOCAL: &str = "http://127.0.0.1:8545";
}

impl RpcConfig {
    /// Create RPC config from environment variables
    ///
    /// Priority:
    /// 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.)
    /// 2. ALCHEMY_API_KEY - builds URLs for all chains
    /// 3. INFURA_API_KEY - builds URLs for supported chains
    /// 4. Public RPC fallbacks (for testing only)
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        // Priority 1: Check per-chain env vars
        if let Ok(url) = std::env::var(env_vars::ETH_RPC_URL) {
            tracing::debug!("Using ETH_RPC_URL for Ethereum");
            urls.insert(chains::ETHEREUM, url);
        }
        if let Ok(url) = std::env::var(env_vars::SEPOLIA_RPC_URL) {
            tracing::debug!("Using SEPOLIA_RPC_URL for Sepolia");
            urls.insert(chains::SEPOLIA, url);
        }
        if let Ok(url) = std::env::var(env_vars::HOLESKY_RPC_URL) {
            tracing::debug!("Using HOLESKY_RPC_URL for Holesky");
            urls.insert(chains::HOLESKY, url);
        }
        if let Ok(url) = std::env::var(env_vars::LOCAL_RPC_URL) {
            tracing::debug!("Using LOCAL_RPC_URL for the local dev node");
            urls.insert(chains::LOCAL, url);
        }

        // Priority 2: If no per-chain vars, try ALCHEMY_API_KEY
        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://eth-sepolia.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::HOLESKY,
                    format!("https://eth-holesky.g.alchemy.com/v2/{}", key),
                );
            }
        }

        // Priority 3: If no Alchemy, try INFURA_API_KEY
        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                urls.insert(
                    chains::ETHEREUM,
                    format!("https://mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://sepolia.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::HOLESKY,
                    format!("https://holesky.infura.io/v3/{}", key),
                );
            }
        }

        // Priority 4: Fall back to public RPCs for any missing chains
        if !urls.contains_key(&chains::ETHEREUM) {
            tracing::warn!("No RPC configured for Ethereum, using public RPC (rate limited)");
        }
        urls.entry(chains::ETHEREUM)
            .or_insert_with(|| public_rpcs::ETHEREUM.to_string());
        urls.entry(chains::SEPOLIA)
            .or_insert_with(|| public_rpcs::SEPOLIA.to_string());
        urls.entry(chains::HOLESKY)
            .or_insert_with(|| public_rpcs::HOLESKY.to_string());
        urls.entry(chains::LOCAL)
            .or_insert_with(|| public_rpcs::LOCAL.to_string());

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Get all configured chain IDs
    pub fn chains(&self) -> impl Iterator<Item = &u64> {
        self.urls.keys()
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
