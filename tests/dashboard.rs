//! End-to-end dashboard tests against a scripted wallet provider

use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};
use transactions_dashboard::contract::abi::{
    addToBlockchainCall, getAllTransactionsCall, getTransactionCountCall, TransferStruct,
};
use transactions_dashboard::provider::WalletProvider;
use transactions_dashboard::{Config, Dashboard, Error, Result, TransferDraft};

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// Scripted provider: in-memory record list, fixed accounts and balances
struct MockProvider {
    accounts: Vec<Address>,
    balance: U256,
    contract: Address,
    deployed: bool,
    fail_sends: bool,
    /// When set, confirmations block until the gate is released
    confirm_gate: Option<Arc<Notify>>,
    records: Mutex<Vec<TransferStruct>>,
    next_timestamp: AtomicU64,
    chain_tx: watch::Sender<u64>,
}

impl MockProvider {
    fn new(contract: Address) -> Self {
        let (chain_tx, _) = watch::channel(31337);
        Self {
            accounts: vec![Address::repeat_byte(0xaa)],
            balance: U256::from(10 * ONE_ETHER),
            contract,
            deployed: true,
            fail_sends: false,
            confirm_gate: None,
            records: Mutex::new(Vec::new()),
            next_timestamp: AtomicU64::new(1_700_000_000),
            chain_tx,
        }
    }

    async fn seed_record(&self, sender: Address, receiver: Address, amount: U256) {
        let timestamp = self.next_timestamp.fetch_add(1, Ordering::SeqCst);
        self.records.lock().await.push(TransferStruct {
            sender,
            receiver,
            amount,
            message: "seeded".to_string(),
            timestamp: U256::from(timestamp),
            keyword: "seed".to_string(),
        });
    }

    fn switch_chain(&self, chain_id: u64) {
        self.chain_tx.send_replace(chain_id);
    }

    fn calldata(tx: &TransactionRequest) -> Bytes {
        tx.input.input().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if self.accounts.is_empty() {
            return Err(Error::UserRejected("request denied".to_string()));
        }
        Ok(self.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        Ok(self.balance)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes> {
        let data = Self::calldata(&tx);
        if data.starts_with(&getAllTransactionsCall::SELECTOR) {
            let records = self.records.lock().await.clone();
            Ok(Bytes::from(records.abi_encode()))
        } else if data.starts_with(&getTransactionCountCall::SELECTOR) {
            let count = U256::from(self.records.lock().await.len());
            Ok(Bytes::from(count.abi_encode()))
        } else {
            Err(Error::Network("unexpected call".to_string()))
        }
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        if self.deployed && address == self.contract {
            Ok(Bytes::from(vec![0x60, 0x80]))
        } else {
            Ok(Bytes::new())
        }
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(*self.chain_tx.borrow())
    }

    async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash> {
        if self.fail_sends {
            return Err(Error::Network("rpc unavailable".to_string()));
        }
        Ok(TxHash::repeat_byte(0x41))
    }

    async fn send_and_confirm(&self, tx: TransactionRequest) -> Result<TxHash> {
        if self.fail_sends {
            return Err(Error::Network("rpc unavailable".to_string()));
        }
        if let Some(gate) = &self.confirm_gate {
            gate.notified().await;
        }

        let data = Self::calldata(&tx);
        if tx.to == Some(TxKind::Call(self.contract))
            && data.starts_with(&addToBlockchainCall::SELECTOR)
        {
            let call = addToBlockchainCall::abi_decode(&data)
                .map_err(|e| Error::Network(e.to_string()))?;
            let timestamp = self.next_timestamp.fetch_add(1, Ordering::SeqCst);
            self.records.lock().await.push(TransferStruct {
                sender: tx.from.unwrap_or_default(),
                receiver: call.receiver,
                amount: call.amount,
                message: call.message,
                timestamp: U256::from(timestamp),
                keyword: call.keyword,
            });
        }
        Ok(TxHash::repeat_byte(0x42))
    }

    fn chain_changed(&self) -> watch::Receiver<u64> {
        self.chain_tx.subscribe()
    }
}

struct Fixture {
    provider: Arc<MockProvider>,
    dashboard: Arc<Dashboard>,
    // Keeps the count cache directory alive for the test duration
    _dir: tempfile::TempDir,
}

fn fixture_with(build: impl FnOnce(MockProvider) -> MockProvider) -> Fixture {
    let contract = Address::repeat_byte(0xc0);
    let provider = Arc::new(build(MockProvider::new(contract)));

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        contract_address: Some(contract.to_string()),
        count_cache_path: dir
            .path()
            .join("count.json")
            .to_string_lossy()
            .into_owned(),
        ..Config::default()
    };

    let dashboard = Arc::new(Dashboard::new(
        Some(provider.clone() as Arc<dyn WalletProvider>),
        config,
    ));
    Fixture {
        provider,
        dashboard,
        _dir: dir,
    }
}

fn fixture() -> Fixture {
    fixture_with(|p| p)
}

#[tokio::test]
async fn single_record_feed_matches_chain_data() {
    let fx = fixture();
    let sender = Address::repeat_byte(0x11);
    let receiver = Address::repeat_byte(0x22);
    fx.provider
        .seed_record(sender, receiver, U256::from(ONE_ETHER))
        .await;

    let account = fx.dashboard.restore().await.unwrap();
    assert_eq!(account, Some(Address::repeat_byte(0xaa)));

    let records = fx.dashboard.feed().records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address_from, sender);
    assert_eq!(records[0].address_to, receiver);
    assert_eq!(records[0].amount, "1");
}

#[tokio::test]
async fn feed_is_newest_first() {
    let fx = fixture();
    let a = Address::repeat_byte(0x11);
    let b = Address::repeat_byte(0x22);
    // Chain order: 1 ETH first, then 2 ETH
    fx.provider.seed_record(a, b, U256::from(ONE_ETHER)).await;
    fx.provider
        .seed_record(a, b, U256::from(2 * ONE_ETHER))
        .await;

    fx.dashboard.restore().await.unwrap();

    let records = fx.dashboard.feed().records().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].amount, "2");
    assert_eq!(records[1].amount, "1");
}

#[tokio::test]
async fn connect_without_provider_fails_and_mutates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        contract_address: Some(Address::repeat_byte(0xc0).to_string()),
        count_cache_path: dir
            .path()
            .join("count.json")
            .to_string_lossy()
            .into_owned(),
        ..Config::default()
    };
    let dashboard = Dashboard::new(None, config);

    assert!(matches!(
        dashboard.connect().await,
        Err(Error::ProviderMissing(_))
    ));
    assert!(matches!(
        dashboard.restore().await,
        Err(Error::ProviderMissing(_))
    ));

    let state = dashboard.session_state().await;
    assert_eq!(state.account, None);
    assert!(dashboard.feed().is_empty().await);
    assert_eq!(dashboard.cached_count(), None);
}

#[tokio::test]
async fn failed_submit_clears_flag_and_leaves_feed_unchanged() {
    let fx = fixture_with(|mut p| {
        p.fail_sends = true;
        p
    });
    fx.provider
        .seed_record(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(ONE_ETHER),
        )
        .await;

    // Restore works (reads still succeed), only sends fail
    fx.dashboard.restore().await.unwrap();
    let before = fx.dashboard.feed().records().await;

    let draft = TransferDraft {
        to: Address::repeat_byte(0x33).to_string(),
        amount: "0.5".to_string(),
        message: "will fail".to_string(),
        keyword: "fail".to_string(),
    };
    assert!(matches!(
        fx.dashboard.submit(&draft).await,
        Err(Error::Network(_))
    ));

    assert!(!fx.dashboard.is_submitting());
    assert_eq!(fx.dashboard.feed().records().await, before);
}

#[tokio::test]
async fn submit_rejects_malformed_drafts() {
    let fx = fixture();
    fx.dashboard.restore().await.unwrap();

    let bad_address = TransferDraft {
        to: "not-an-address".to_string(),
        amount: "1".to_string(),
        ..TransferDraft::default()
    };
    assert!(matches!(
        fx.dashboard.submit(&bad_address).await,
        Err(Error::Validation(_))
    ));

    let bad_amount = TransferDraft {
        to: Address::repeat_byte(0x33).to_string(),
        amount: "1.2.3".to_string(),
        ..TransferDraft::default()
    };
    assert!(matches!(
        fx.dashboard.submit(&bad_amount).await,
        Err(Error::Validation(_))
    ));
    assert!(!fx.dashboard.is_submitting());
}

#[tokio::test]
async fn successful_submit_appends_to_feed() {
    let fx = fixture();
    fx.provider
        .seed_record(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(ONE_ETHER),
        )
        .await;

    fx.dashboard.restore().await.unwrap();
    assert_eq!(fx.dashboard.feed().len().await, 1);

    let receiver = Address::repeat_byte(0x33);
    let draft = TransferDraft {
        to: receiver.to_string(),
        amount: "0.1".to_string(),
        message: "coffee".to_string(),
        keyword: "gm".to_string(),
    };
    fx.dashboard.submit(&draft).await.unwrap();

    let records = fx.dashboard.feed().records().await;
    assert_eq!(records.len(), 2);
    // Newest entry is the submission, amount formatted back to "0.1"
    assert_eq!(records[0].amount, "0.1");
    assert_eq!(records[0].address_to, receiver);
    assert_eq!(records[0].address_from, Address::repeat_byte(0xaa));
    assert_eq!(records[0].message, "coffee");
    assert_eq!(records[0].keyword, "gm");

    // Count hint persisted after the refresh
    assert_eq!(fx.dashboard.cached_count(), Some(2));
}

#[tokio::test]
async fn concurrent_submissions_are_serialized() {
    let gate = Arc::new(Notify::new());
    let fx = fixture_with(|mut p| {
        p.confirm_gate = Some(gate.clone());
        p
    });
    fx.dashboard.restore().await.unwrap();

    let draft = TransferDraft {
        to: Address::repeat_byte(0x33).to_string(),
        amount: "0.1".to_string(),
        ..TransferDraft::default()
    };

    let dashboard = fx.dashboard.clone();
    let first_draft = draft.clone();
    let first = tokio::spawn(async move { dashboard.submit(&first_draft).await });

    // Wait until the first submission is parked at the confirmation gate
    tokio::time::timeout(std::time::Duration::from_secs(1), async {
        while !fx.dashboard.is_submitting() {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first submission never started");

    assert!(matches!(
        fx.dashboard.submit(&draft).await,
        Err(Error::SubmissionPending)
    ));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(!fx.dashboard.is_submitting());
    assert_eq!(fx.dashboard.feed().len().await, 1);
}

#[tokio::test]
async fn undeployed_contract_is_reported() {
    let fx = fixture_with(|mut p| {
        p.deployed = false;
        p
    });

    // Restore refreshes with a session address, which triggers the check
    assert!(matches!(
        fx.dashboard.restore().await,
        Err(Error::ContractUnavailable(_))
    ));
}

#[tokio::test]
async fn network_switch_refreshes_state() {
    let fx = fixture();
    fx.provider
        .seed_record(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(ONE_ETHER),
        )
        .await;

    fx.dashboard.restore().await.unwrap();
    assert_eq!(fx.dashboard.feed().len().await, 1);

    let watcher = fx.dashboard.clone().spawn_chain_watcher().unwrap();

    // A record lands while the feed is stale
    fx.provider
        .seed_record(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(3 * ONE_ETHER),
        )
        .await;
    assert_eq!(fx.dashboard.feed().len().await, 1);

    fx.provider.switch_chain(11155111);

    tokio::time::timeout(std::time::Duration::from_secs(1), async {
        while fx.dashboard.feed().len().await != 2 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("feed never refreshed after the network switch");

    // Session survived the switch via silent restore
    let state = fx.dashboard.session_state().await;
    assert_eq!(state.account, Some(Address::repeat_byte(0xaa)));

    watcher.abort();
}
