//! Dashboard orchestration
//!
//! Ties the session manager, contract gateway, feed store, and count cache
//! together. The provider is injected rather than read from a global, and a
//! network switch invalidates state and re-fetches instead of forcing a
//! restart. The feed refreshes after session restore, explicit connect, and
//! every successful submission, so reads issued after a write observe it.

use crate::config::Config;
use crate::contract::{ContractGateway, TransferDraft};
use crate::feed::TransactionFeed;
use crate::provider::WalletProvider;
use crate::session::{SessionState, WalletSession};
use crate::store::CountCache;
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash};
use std::sync::Arc;
use tokio::task::JoinHandle;

struct WalletStack {
    provider: Arc<dyn WalletProvider>,
    session: WalletSession,
}

pub struct Dashboard {
    wallet: Option<WalletStack>,
    feed: TransactionFeed,
    count_cache: CountCache,
    config: Config,
}

impl Dashboard {
    /// Build a dashboard around an injected provider, or without one when
    /// detection failed (every wallet-touching operation then fails with
    /// `ProviderMissing`)
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, config: Config) -> Self {
        let count_cache = CountCache::new(&config.count_cache_path);
        let wallet = provider.map(|provider| WalletStack {
            session: WalletSession::new(provider.clone()),
            provider,
        });
        Self {
            wallet,
            feed: TransactionFeed::default(),
            count_cache,
            config,
        }
    }

    fn wallet(&self) -> Result<&WalletStack> {
        self.wallet.as_ref().ok_or_else(|| {
            Error::ProviderMissing("no wallet provider detected; configure an RPC endpoint".into())
        })
    }

    /// Lazily bind a gateway to the configured contract
    pub fn gateway(&self) -> Result<ContractGateway> {
        let wallet = self.wallet()?;
        let address = self.config.contract_address()?;
        Ok(ContractGateway::new(wallet.provider.clone(), address))
    }

    pub fn feed(&self) -> &TransactionFeed {
        &self.feed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last persisted transaction count, advisory only
    pub fn cached_count(&self) -> Option<u64> {
        self.count_cache.load()
    }

    pub async fn session_state(&self) -> SessionState {
        match &self.wallet {
            Some(wallet) => wallet.session.state().await,
            None => SessionState::default(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.wallet
            .as_ref()
            .map(|w| w.session.is_submitting())
            .unwrap_or(false)
    }

    /// Request account access, then refresh feed and count
    pub async fn connect(&self) -> Result<Address> {
        let account = self.wallet()?.session.connect().await?;
        self.refresh().await?;
        Ok(account)
    }

    /// Silently restore an authorized session; refreshes only when one exists
    pub async fn restore(&self) -> Result<Option<Address>> {
        let Some(account) = self.wallet()?.session.restore().await? else {
            return Ok(None);
        };
        self.refresh().await?;
        Ok(Some(account))
    }

    /// Re-fetch the feed and persist the latest count hint
    pub async fn refresh(&self) -> Result<()> {
        let wallet = self.wallet()?;
        let gateway = self.gateway()?;

        let session_account = wallet.session.account().await;
        let records = gateway.list_transactions(session_account).await?;
        self.feed.replace(records).await;

        let count = gateway.transaction_count().await?;
        if let Err(e) = self.count_cache.store(count) {
            tracing::warn!(error = %e, "failed to persist transaction count hint");
        }
        Ok(())
    }

    /// Submit a draft transfer
    ///
    /// At most one submission may be in flight; a second concurrent call
    /// fails with `SubmissionPending`. On success the balance, feed, and
    /// count are refreshed before this returns.
    pub async fn submit(&self, draft: &TransferDraft) -> Result<TxHash> {
        let wallet = self.wallet()?;
        let _guard = wallet.session.begin_submission()?;

        let account = wallet.session.account().await.ok_or_else(|| {
            Error::UserRejected("no connected account; connect before submitting".to_string())
        })?;

        let gateway = self.gateway()?;
        let hash = gateway.submit(account, draft).await?;

        wallet.session.refresh_balance().await?;
        self.refresh().await?;
        Ok(hash)
    }

    /// React to network switches by invalidating and re-fetching state
    pub fn spawn_chain_watcher(self: Arc<Self>) -> Result<JoinHandle<()>> {
        let mut rx = self.wallet()?.provider.chain_changed();
        let dashboard = self;

        Ok(tokio::spawn(async move {
            let mut last = *rx.borrow_and_update();
            while rx.changed().await.is_ok() {
                let chain_id = *rx.borrow_and_update();
                // 0 is the channel's "not yet polled" sentinel; the first
                // real observation is the baseline, not a switch
                if last != 0 && chain_id != last {
                    tracing::info!(from = last, to = chain_id, "network switched");
                    dashboard.handle_chain_changed().await;
                }
                last = chain_id;
            }
        }))
    }

    async fn handle_chain_changed(&self) {
        self.feed.clear().await;
        if let Some(wallet) = &self.wallet {
            wallet.session.reset().await;
        }
        match self.restore().await {
            Ok(Some(account)) => tracing::info!(%account, "session restored on new network"),
            Ok(None) => tracing::info!("no authorized account on new network"),
            Err(e) => tracing::warn!(error = %e, "refresh after network switch failed"),
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("has_provider", &self.wallet.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
