//! Transaction dashboard CLI
//!
//! Command-line interface for the Transactions contract: inspect the wallet
//! session, browse the feed, and submit transfers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use transactions_dashboard::{provider, Config, Dashboard, Result, TransferDraft};

#[derive(Parser)]
#[command(name = "txdash")]
#[command(about = "Dashboard client for the Transactions smart contract")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the session: account, balance, cached transaction count
    Status,

    /// Request account access and refresh the feed
    Connect,

    /// Print the transaction feed, newest first
    Feed,

    /// Submit a transfer
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in ether, e.g. 0.1
        #[arg(long)]
        amount: String,

        /// Message to record with the transfer
        #[arg(long, default_value = "")]
        message: String,

        /// Keyword to record with the transfer
        #[arg(long, default_value = "")]
        keyword: String,
    },

    /// Print the on-chain transaction count
    Count,

    /// Show current configuration
    Config,

    /// Keep running and refresh state on network switches
    Watch,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides();

    match cli.command {
        Commands::Status => run_status(config).await,
        Commands::Connect => run_connect(config).await,
        Commands::Feed => run_feed(config).await,
        Commands::Send {
            to,
            amount,
            message,
            keyword,
        } => {
            let draft = TransferDraft {
                to,
                amount,
                message,
                keyword,
            };
            run_send(config, draft).await
        }
        Commands::Count => run_count(config).await,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config).unwrap());
            Ok(())
        }
        Commands::Watch => run_watch(config).await,
    }
}

/// Detect a provider for the configured chain, downgrading failure to `None`
/// so commands can report `ProviderMissing` at their own boundary
fn detect_provider(config: &Config) -> Option<Arc<dyn provider::WalletProvider>> {
    match provider::detect(config) {
        Ok(provider) => Some(provider),
        Err(e) => {
            tracing::warn!(error = %e, "no wallet provider available");
            None
        }
    }
}

async fn run_status(config: Config) -> Result<()> {
    let dashboard = Dashboard::new(detect_provider(&config), config);

    match dashboard.restore().await? {
        Some(_) => {
            let state = dashboard.session_state().await;
            // restore() guarantees the account is set here
            if let Some(account) = state.account {
                println!("account:  {}", account);
            }
            println!("balance:  {} ETH", state.balance);
            println!("feed:     {} transactions", dashboard.feed().len().await);
        }
        None => println!("disconnected (no authorized account)"),
    }
    if let Some(count) = dashboard.cached_count() {
        println!("cached transaction count: {}", count);
    }
    Ok(())
}

async fn run_connect(config: Config) -> Result<()> {
    let dashboard = Dashboard::new(detect_provider(&config), config);

    let account = dashboard.connect().await?;
    let state = dashboard.session_state().await;
    println!("connected: {}", account);
    println!("balance:   {} ETH", state.balance);
    println!("feed:      {} transactions", dashboard.feed().len().await);
    Ok(())
}

async fn run_feed(config: Config) -> Result<()> {
    let dashboard = Dashboard::new(detect_provider(&config), config);

    if dashboard.restore().await?.is_none() {
        // No session; read the feed without one
        let records = dashboard.gateway()?.list_transactions(None).await?;
        dashboard.feed().replace(records).await;
    }

    let records = dashboard.feed().records().await;
    if records.is_empty() {
        println!("no transactions yet");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {} -> {}  {} ETH  [{}] {}",
            record.timestamp,
            record.address_from,
            record.address_to,
            record.amount,
            record.keyword,
            record.message
        );
    }
    Ok(())
}

async fn run_send(config: Config, draft: TransferDraft) -> Result<()> {
    let dashboard = Dashboard::new(detect_provider(&config), config);

    if dashboard.restore().await?.is_none() {
        dashboard.connect().await?;
    }

    let hash = dashboard.submit(&draft).await?;
    println!("confirmed: {}", hash);
    println!("feed now has {} transactions", dashboard.feed().len().await);
    Ok(())
}

async fn run_count(config: Config) -> Result<()> {
    let dashboard = Dashboard::new(detect_provider(&config), config);

    let count = dashboard.gateway()?.transaction_count().await?;
    println!("on-chain transaction count: {}", count);
    if let Some(cached) = dashboard.cached_count() {
        println!("cached hint:                {}", cached);
    }
    Ok(())
}

async fn run_watch(config: Config) -> Result<()> {
    let dashboard = Arc::new(Dashboard::new(detect_provider(&config), config));

    dashboard.restore().await?;
    let watcher = dashboard.clone().spawn_chain_watcher()?;
    tracing::info!("watching for network switches, ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| transactions_dashboard::Error::Network(e.to_string()))?;
    watcher.abort();
    Ok(())
}
