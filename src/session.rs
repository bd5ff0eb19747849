//! Wallet session manager
//!
//! Tracks the active account and its formatted balance, and serializes
//! submissions: at most one may be in flight per session. The submission flag
//! is cleared on every exit path via a drop guard, so a failed submission can
//! never leave the session stuck in the loading state.

use crate::provider::WalletProvider;
use crate::units;
use crate::{Error, Result};
use alloy::primitives::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Snapshot of the session, safe to hand to a presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Active account; `None` = disconnected
    pub account: Option<Address>,
    /// Formatted native balance of the active account
    pub balance: String,
}

pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    state: RwLock<SessionState>,
    submitting: AtomicBool,
}

impl WalletSession {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(SessionState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub async fn account(&self) -> Option<Address> {
        self.state.read().await.account
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Whether a submission is currently in flight
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Request account access; the first authorized account becomes active
    ///
    /// Fails with `UserRejected` when the provider grants no accounts. No
    /// session state is touched on failure.
    pub async fn connect(&self) -> Result<Address> {
        let accounts = self.provider.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| Error::UserRejected("wallet returned no accounts".to_string()))?;
        self.activate(account).await?;
        Ok(account)
    }

    /// Silently adopt an already-authorized account, if any
    pub async fn restore(&self) -> Result<Option<Address>> {
        let accounts = self.provider.accounts().await?;
        let Some(account) = accounts.first().copied() else {
            tracing::debug!("no authorized account, session stays disconnected");
            return Ok(None);
        };
        self.activate(account).await?;
        Ok(Some(account))
    }

    async fn activate(&self, account: Address) -> Result<()> {
        // Balance is fetched before any state is written, so a network
        // failure leaves the session untouched
        let balance = self.provider.get_balance(account).await?;
        let mut state = self.state.write().await;
        state.account = Some(account);
        state.balance = units::format_ether(balance);
        tracing::info!(account = %account, balance = %state.balance, "session connected");
        Ok(())
    }

    /// Re-fetch the balance of the active account
    pub async fn refresh_balance(&self) -> Result<()> {
        let Some(account) = self.account().await else {
            return Ok(());
        };
        let balance = self.provider.get_balance(account).await?;
        self.state.write().await.balance = units::format_ether(balance);
        Ok(())
    }

    /// Drop the active account, e.g. after a network switch
    pub async fn reset(&self) {
        *self.state.write().await = SessionState::default();
    }

    /// Claim the exclusive submission slot
    ///
    /// Fails with `SubmissionPending` while another submission holds it. The
    /// returned guard releases the slot when dropped.
    pub(crate) fn begin_submission(&self) -> Result<SubmissionGuard<'_>> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::SubmissionPending);
        }
        Ok(SubmissionGuard { session: self })
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}

pub(crate) struct SubmissionGuard<'a> {
    session: &'a WalletSession,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.session.submitting.store(false, Ordering::SeqCst);
    }
}
