//! Wallet provider abstraction
//!
//! The wallet surface is a trait so the session and gateway layers are handed
//! whatever provider is available: an RPC-backed one in production, a
//! scripted one in tests. Nothing in the crate reaches for a global provider.

pub mod rpc;

pub use rpc::RpcProvider;

use crate::config::{Config, RpcConfig};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// The injected wallet surface
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access; may involve user interaction
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts already authorized for this session; never prompts
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Native balance of an address, in wei
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Read-only contract call (eth_call)
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Deployed bytecode at an address; empty when nothing is deployed
    async fn get_code(&self, address: Address) -> Result<Bytes>;

    /// Chain id the provider is currently connected to
    async fn chain_id(&self) -> Result<u64>;

    /// Submit a transaction; resolves once it is accepted by the node
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Submit a transaction and wait for on-chain confirmation
    async fn send_and_confirm(&self, tx: TransactionRequest) -> Result<TxHash>;

    /// Network-switch notifications; the receiver yields the new chain id
    fn chain_changed(&self) -> watch::Receiver<u64>;
}

/// Build the production provider for the configured chain
///
/// Fails with `ProviderMissing` when no RPC endpoint is known for the chain,
/// the headless analog of a missing wallet extension.
pub fn detect(config: &Config) -> Result<Arc<dyn WalletProvider>> {
    let rpc = RpcConfig::from_env();
    let url = rpc.get(config.chain_id).ok_or_else(|| {
        Error::ProviderMissing(format!(
            "no RPC endpoint configured for chain {}",
            config.chain_id
        ))
    })?;

    let provider = RpcProvider::connect(url, config)?;
    Ok(Arc::new(provider))
}
