//! Contract gateway
//!
//! Binds the Transactions contract address to an injected wallet provider and
//! exposes its three operations: list the records, count them, and append a
//! new one. Raw wei amounts and epoch timestamps are mapped into display
//! units here, on the way out of the ABI layer.

pub mod abi;

use crate::feed::TransactionRecord;
use crate::provider::WalletProvider;
use crate::units;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use std::sync::Arc;

/// User-entered draft of a new transfer
#[derive(Debug, Clone, Default)]
pub struct TransferDraft {
    /// Recipient address, hex string
    pub to: String,
    /// Decimal ether string
    pub amount: String,
    pub message: String,
    pub keyword: String,
}

/// Contract handle bound to a provider and a deployed address
pub struct ContractGateway {
    provider: Arc<dyn WalletProvider>,
    address: Address,
}

impl ContractGateway {
    pub fn new(provider: Arc<dyn WalletProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Verify the contract actually has code deployed
    pub async fn ensure_deployed(&self) -> Result<()> {
        let code = self.provider.get_code(self.address).await?;
        if code.is_empty() {
            return Err(Error::ContractUnavailable(format!(
                "no code deployed at {}",
                self.address
            )));
        }
        Ok(())
    }

    /// Read all on-chain records, newest first
    ///
    /// The deployment check runs only when a session address is supplied;
    /// cold reads skip the extra round trip.
    pub async fn list_transactions(
        &self,
        session: Option<Address>,
    ) -> Result<Vec<TransactionRecord>> {
        if session.is_some() {
            self.ensure_deployed().await?;
        }

        let calldata = abi::getAllTransactionsCall {}.abi_encode();
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(calldata).into());
        let raw = self.provider.call(tx).await?;

        let transfers = abi::getAllTransactionsCall::abi_decode_returns(&raw)
            .map_err(|e| Error::Network(format!("undecodable getAllTransactions reply: {}", e)))?;

        let mut records: Vec<TransactionRecord> = transfers
            .iter()
            .map(TransactionRecord::from_transfer)
            .collect();
        // Chain order is oldest first
        records.reverse();

        tracing::debug!(count = records.len(), "fetched transaction feed");
        Ok(records)
    }

    /// Authoritative number of on-chain records
    pub async fn transaction_count(&self) -> Result<u64> {
        let calldata = abi::getTransactionCountCall {}.abi_encode();
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(calldata).into());
        let raw = self.provider.call(tx).await?;

        let count = abi::getTransactionCountCall::abi_decode_returns(&raw)
            .map_err(|e| Error::Network(format!("undecodable getTransactionCount reply: {}", e)))?;
        u64::try_from(count)
            .map_err(|_| Error::Network(format!("transaction count out of range: {}", count)))
    }

    /// Submit a transfer: the value transfer through the wallet first, then
    /// the contract record call, awaited until it is mined
    pub async fn submit(&self, from: Address, draft: &TransferDraft) -> Result<TxHash> {
        let to: Address = draft
            .to
            .trim()
            .parse()
            .map_err(|e| Error::Validation(format!("invalid recipient {:?}: {}", draft.to, e)))?;
        let amount = units::parse_ether(&draft.amount)?;

        let transfer = TransactionRequest::default()
            .from(from)
            .to(to)
            .value(amount);
        let hash = self.provider.send_transaction(transfer).await?;
        tracing::debug!(%hash, "value transfer submitted");

        let calldata = abi::addToBlockchainCall {
            receiver: to,
            amount,
            message: draft.message.clone(),
            keyword: draft.keyword.clone(),
        }
        .abi_encode();
        let record = TransactionRequest::default()
            .from(from)
            .to(self.address)
            .input(Bytes::from(calldata).into());

        let hash = self.provider.send_and_confirm(record).await?;
        tracing::info!(%hash, to = %to, amount = %draft.amount, "transfer recorded on-chain");
        Ok(hash)
    }
}

impl std::fmt::Debug for ContractGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGateway")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
