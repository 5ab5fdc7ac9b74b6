use evm_airdrop::address_book::AddressBook;
use evm_airdrop::config::AirdropConfig;
use evm_airdrop::report;
use evm_airdrop::runner::{Workflow, WorkflowRunner};

use airdrop_core::{
    chain_name, setup_logger, setup_logger_with_file, AirdropSession, LatencyConfig, MockSource,
    SessionConfig,
};
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulated airdrop scan / claim / sell session", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/evm-airdrop/config.toml")]
    config: String,
    /// Wallet address to connect (repeatable)
    #[arg(short, long = "wallet")]
    wallets: Vec<String>,
    /// File with one wallet address per line
    #[arg(long)]
    address_file: Option<String>,
    /// Chain label for connected wallets
    #[arg(long)]
    chain: Option<String>,
    /// EVM chain id (1, 137, 42161, 10, 8453, 56); unknown ids map to ethereum
    #[arg(long)]
    chain_id: Option<u64>,
    /// Connector display name
    #[arg(long)]
    connector: Option<String>,
    /// Seed for the mock scanner
    #[arg(long)]
    seed: Option<u64>,
    /// Skip every simulated wait
    #[arg(long)]
    instant: bool,
    /// Sell right after claiming
    #[arg(long)]
    sell: bool,
    /// Simulate sweeping every wallet to this address
    #[arg(long)]
    transfer_to: Option<String>,
    /// Print the final session as JSON
    #[arg(long)]
    json: bool,
    /// Write all logs to this file instead of the console + logs/ setup
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = match &args.log_file {
        Some(path) => Some(setup_logger_with_file(path)?),
        None => setup_logger(),
    };
    dotenv().ok();

    info!("Loading config from: {}", args.config);

    let config = AirdropConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;

    let session_config = if args.instant {
        SessionConfig {
            latency: LatencyConfig::zero(),
            ..config.to_session_config()?
        }
    } else {
        config.to_session_config()?
    };

    let mut book = AddressBook::new();
    book.extend(&config.wallets);
    if let Some(path) = args.address_file.as_ref().or(config.address_file.as_ref()) {
        book.merge(AddressBook::load_from_file(path)?);
    }
    book.extend(&args.wallets);
    if let Ok(extra) = env::var("AIRDROP_WALLETS") {
        book.extend(extra.split(','));
    }

    if book.is_empty() {
        error!("No wallet addresses configured. Use --wallet, --address-file or AIRDROP_WALLETS.");
        return Ok(());
    }

    let seed = args.seed.or(config.seed);
    let source = match seed {
        Some(seed) => MockSource::seeded(
            seed,
            session_config.min_airdrops_per_wallet,
            session_config.max_airdrops_per_wallet,
        ),
        None => MockSource::new(
            session_config.min_airdrops_per_wallet,
            session_config.max_airdrops_per_wallet,
        ),
    };
    let session = Arc::new(AirdropSession::new(session_config).with_source(Arc::new(source)));

    let chain = args
        .chain
        .as_deref()
        .or(args.chain_id.map(chain_name))
        .unwrap_or(config.chain());
    let connector = args.connector.as_deref().unwrap_or(config.connector());
    for address in book.addresses() {
        session.connect_wallet(address, chain, connector).await;
    }
    info!("Connected {} wallets on {}", book.len(), chain);

    let workflow = Workflow {
        sell: args.sell,
        transfer_to: args.transfer_to,
    };
    let snapshot = WorkflowRunner::run(Arc::clone(&session), workflow).await?;

    if args.json {
        println!("{}", report::render_json(&snapshot)?);
    } else {
        print!("{}", report::render_table(&snapshot));
    }

    Ok(())
}
