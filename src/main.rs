//! Flowrate - Main Entry Point
//!
//! CLI over the wallet session and market data client. The `rates` command
//! polls the live funding-rate endpoint; `sign-test` runs the full
//! connect-and-sign flow against the in-crate mock wallet.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowrate::config::Config;
use flowrate::market::{FundingRateClient, FundingRateSnapshot, MarketPoller};
use flowrate::persistence::FlagStore;
use flowrate::session::SessionManager;
use flowrate::signing::{OrderParams, OrderSide, OrderSigner};
use flowrate::view::StateAggregator;
use flowrate::wallet::{MockWallet, ProviderKind, ProviderRegistry};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Flowrate CLI
#[derive(Parser)]
#[command(name = "flowrate")]
#[command(version, about = "Wallet session and funding-rate client for Starknet perpetuals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll and display live funding rates
    Rates {
        /// Fetch once and exit instead of polling
        #[arg(long)]
        once: bool,
    },

    /// Connect the mock wallet and sign a test order
    SignTest {
        /// Market to sign for
        #[arg(short, long, default_value = "ETH-USD")]
        market: String,

        /// Order side: long or short
        #[arg(short, long, default_value = "long")]
        side: String,

        /// Order size
        #[arg(long, default_value = "1")]
        size: Decimal,

        /// Order price (0 = market)
        #[arg(short, long, default_value = "0")]
        price: Decimal,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "could not load configuration, using defaults");
        Config::default()
    });
    config.validate()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Rates { once } => run_rates(&config, once).await,
        Commands::SignTest {
            market,
            side,
            size,
            price,
        } => run_sign_test(&config, market, &side, size, price).await,
    }
}

async fn run_rates(config: &Config, once: bool) -> Result<()> {
    let client = FundingRateClient::new(&config.market_data)?;

    if once {
        let snapshot = client.get_funding_rates().await?;
        print_snapshot(&snapshot);
        return Ok(());
    }

    let poller = MarketPoller::new();
    let handle = poller.start(
        Duration::from_millis(config.market_data.poll_interval_ms),
        Arc::new(client),
    )?;
    let mut snapshots = handle.subscribe();

    info!(
        interval_ms = config.market_data.poll_interval_ms,
        "polling funding rates, Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(&snapshot);
                if let Some(error) = handle.last_error() {
                    warn!(error, "last poll tick failed");
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}

async fn run_sign_test(
    config: &Config,
    market: String,
    side: &str,
    size: Decimal,
    price: Decimal,
) -> Result<()> {
    let side = match side.to_ascii_lowercase().as_str() {
        "long" => OrderSide::Long,
        "short" => OrderSide::Short,
        other => anyhow::bail!("unknown side {:?}, expected long or short", other),
    };

    let mut registry = ProviderRegistry::empty();
    registry.register(Arc::new(MockWallet::new(
        ProviderKind::ArgentX,
        "0x0demo000000000000000000000000000000000000000000000000000000abc",
    )));

    // The demo run keeps its reconnect flag in memory so it leaves no state.
    let manager = SessionManager::new(registry, FlagStore::in_memory()?, &config.session);

    let session = manager.connect().await?;
    println!("Wallet: {}", session.address);
    println!("Balance: {}", session.balance.round_dp(4));

    let signer = OrderSigner::new(&manager, config.signing.clone());
    let signature = signer
        .sign_order(&OrderParams {
            market,
            side,
            size,
            price,
            expiration: None,
        })
        .await?;
    println!("Signed order: {}", signature.raw);

    // Assemble the renderer view, with live rates when the endpoint answers.
    let (snapshot_tx, snapshot_rx) = tokio::sync::watch::channel(FundingRateSnapshot::default());
    match FundingRateClient::new(&config.market_data)?.get_funding_rates().await {
        Ok(snapshot) => {
            snapshot_tx.send_replace(snapshot);
        }
        Err(err) => warn!(error = %err, "could not fetch funding rates for the view"),
    }

    let aggregator = StateAggregator::new(&manager, snapshot_rx);
    let view = aggregator.current().await;
    print_snapshot(&FundingRateSnapshot {
        rates: view.funding_rates,
        fetched_at: None,
    });

    Ok(())
}

fn print_snapshot(snapshot: &FundingRateSnapshot) {
    if snapshot.is_empty() {
        println!("No funding rates available yet");
        return;
    }
    for entry in &snapshot.rates {
        println!(
            "{}: {}% | Index Price: {}",
            entry.market, entry.current_rate, entry.index_price
        );
    }
}

fn setup_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // File appender for detailed logs
    let file_appender = tracing_appender::rolling::hourly("logs", "flowrate.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(_guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("flowrate=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(true)
        .init();

    Ok(())
}
