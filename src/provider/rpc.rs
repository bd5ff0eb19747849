//! RPC-backed wallet provider
//!
//! Wraps an alloy HTTP provider plus an optional local signer. The private
//! key comes from the PRIVATE_KEY environment variable as a hex string; it is
//! moved straight into alloy's signer, never serialized, and never logged.
//!
//! A background task polls the node's chain id and feeds the network-switch
//! channel, the headless analog of the injected provider's chainChanged
//! event.

use crate::config::{Config, PRIVATE_KEY_ENV};
use crate::provider::WalletProvider;
use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct RpcProvider {
    inner: DynProvider,
    /// Address of the local signer, when one is configured
    signer_address: Option<Address>,
    chain_tx: watch::Sender<u64>,
    poller: JoinHandle<()>,
}

impl RpcProvider {
    /// Connect to an RPC endpoint, picking up a local signer from PRIVATE_KEY
    /// if one is set
    ///
    /// Must be called from within a tokio runtime (the chain poller is
    /// spawned here).
    pub fn connect(rpc_url: &str, config: &Config) -> Result<Self> {
        let key = std::env::var(PRIVATE_KEY_ENV).ok().map(SecretString::from);
        Self::connect_with_key(rpc_url, key, config.chain_poll_interval_ms)
    }

    /// Connect with an explicit (optional) private key
    pub fn connect_with_key(
        rpc_url: &str,
        key: Option<SecretString>,
        poll_interval_ms: u64,
    ) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL {}: {}", rpc_url, e)))?;

        let (signer_address, inner) = match key {
            Some(key) => {
                let signer = parse_private_key(&key)?;
                let address = signer.address();
                tracing::info!(address = %address, "Loaded local signer");
                let wallet = EthereumWallet::from(signer);
                let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
                (Some(address), provider.erased())
            }
            None => {
                tracing::debug!("No private key set, provider is read-only");
                (None, ProviderBuilder::new().connect_http(url).erased())
            }
        };

        // 0 = not yet polled; real chain ids are never 0
        let (chain_tx, _) = watch::channel(0u64);
        let poller = spawn_chain_poller(inner.clone(), chain_tx.clone(), poll_interval_ms);

        Ok(Self {
            inner,
            signer_address,
            chain_tx,
            poller,
        })
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer_address
    }
}

impl Drop for RpcProvider {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

// Implement Debug manually so the provider internals stay out of logs
impl std::fmt::Debug for RpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcProvider")
            .field("signer_address", &self.signer_address)
            .finish_non_exhaustive()
    }
}

fn parse_private_key(key: &SecretString) -> Result<PrivateKeySigner> {
    let raw = key.expose_secret();
    // Remove 0x prefix if present
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    raw.parse()
        .map_err(|e| Error::Config(format!("invalid private key: {}", e)))
}

fn spawn_chain_poller(
    provider: DynProvider,
    tx: watch::Sender<u64>,
    interval_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match provider.get_chain_id().await {
                Ok(id) => {
                    tx.send_if_modified(|current| {
                        if *current != id {
                            *current = id;
                            true
                        } else {
                            false
                        }
                    });
                }
                Err(e) => tracing::debug!(error = %e, "chain id poll failed"),
            }
        }
    })
}

fn network_err(e: impl std::fmt::Display) -> Error {
    Error::Network(e.to_string())
}

#[async_trait]
impl WalletProvider for RpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        match self.signer_address {
            Some(address) => Ok(vec![address]),
            None => Err(Error::UserRejected(format!(
                "no signer configured; set {} to authorize an account",
                PRIVATE_KEY_ENV
            ))),
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.signer_address.into_iter().collect())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.inner.get_balance(address).await.map_err(network_err)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        self.inner.call(tx).await.map_err(network_err)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.inner.get_code_at(address).await.map_err(network_err)
    }

    async fn chain_id(&self) -> Result<u64> {
        self.inner.get_chain_id().await.map_err(network_err)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self.inner.send_transaction(tx).await.map_err(network_err)?;
        Ok(*pending.tx_hash())
    }

    async fn send_and_confirm(&self, tx: TransactionRequest) -> Result<TxHash> {
        let pending = self.inner.send_transaction(tx).await.map_err(network_err)?;
        pending.watch().await.map_err(network_err)
    }

    fn chain_changed(&self) -> watch::Receiver<u64> {
        self.chain_tx.subscribe()
    }
}
