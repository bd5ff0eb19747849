//! Headless client for the Transactions smart contract
//!
//! Manages a wallet session (active account, balance, network), reads the
//! on-chain transaction feed, and submits new transfers through a single
//! deployed contract.
//!
//! # Design
//!
//! - The wallet surface is the [`provider::WalletProvider`] trait; providers
//!   are injected, never read from a global.
//! - [`dashboard::Dashboard`] sequences the provider calls: connect or
//!   restore a session, refresh the feed, submit a transfer (value transfer
//!   first, then the contract record call, awaited to confirmation).
//! - Submissions are serialized: at most one in flight per session.
//! - A network switch invalidates cached state and re-fetches it instead of
//!   requiring a restart.

pub mod config;
pub mod contract;
pub mod dashboard;
pub mod feed;
pub mod provider;
pub mod session;
pub mod store;
pub mod units;

mod error;

// Re-export commonly used types
pub use config::{Config, RpcConfig};
pub use contract::{ContractGateway, TransferDraft};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use feed::{TransactionFeed, TransactionRecord};
pub use session::{SessionState, WalletSession};
pub use store::CountCache;
