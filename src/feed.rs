//! Transaction feed store
//!
//! Holds the latest display-ready view of the on-chain records. The feed is
//! replaced wholesale on every refresh and discarded on the next one; nothing
//! here is authoritative.

use crate::contract::abi::TransferStruct;
use crate::units;
use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::RwLock;

/// A single display record, immutable once built from chain data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub address_from: Address,
    pub address_to: Address,
    /// Decimal ether string
    pub amount: String,
    pub message: String,
    pub keyword: String,
    /// Local time string
    pub timestamp: String,
}

impl TransactionRecord {
    /// Map a raw on-chain record into display units
    pub fn from_transfer(transfer: &TransferStruct) -> Self {
        Self {
            address_from: transfer.sender,
            address_to: transfer.receiver,
            amount: units::format_ether(transfer.amount),
            message: transfer.message.clone(),
            keyword: transfer.keyword.clone(),
            timestamp: units::format_timestamp(
                u64::try_from(transfer.timestamp).unwrap_or(u64::MAX),
            ),
        }
    }
}

/// Latest `list_transactions` result, newest first
#[derive(Debug, Default)]
pub struct TransactionFeed {
    records: RwLock<Vec<TransactionRecord>>,
}

impl TransactionFeed {
    /// Replace the feed with a fresh newest-first listing
    pub async fn replace(&self, records: Vec<TransactionRecord>) {
        *self.records.write().await = records;
    }

    /// Snapshot of the current records, newest first
    pub async fn records(&self) -> Vec<TransactionRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop all records, e.g. when their network is no longer current
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}
