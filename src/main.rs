//! Channel Signal Relay
//!
//! Long-running channel watcher plus a one-shot extractor check.

use clap::{Parser, Subcommand};
use signal_relay::{
    catalog::CurrencyCatalog,
    client::{BittrexClient, MarketPriceLookup},
    config::Config,
    extractor::SourceRegistry,
    forward::{Forwarder, MonitorCommand, NoopForwarder},
    ingester::{BotApiSource, UpdateLoop},
    pipeline::SignalPipeline,
    report::Reporter,
    types::Exchange,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "signal-relay")]
#[command(about = "Extracts trading signals from channel posts and relays them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch channels and process every new post
    Start,
    /// Run one message through a source's extractor and print the result
    Test {
        /// Source id (channel username), e.g. VipCryptoZ
        #[arg(short, long)]
        source: String,
        /// Message text
        #[arg(short, long, conflicts_with = "file")]
        message: Option<String>,
        /// Read the message text from a file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// List the registered sources
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Start => start(config).await,
        Commands::Test {
            source,
            message,
            file,
        } => test(config, &source, message, file).await,
        Commands::Sources => list_sources(),
    }
}

async fn start(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting signal relay");

    let source = Arc::new(BotApiSource::new(&config.telegram)?);
    let pipeline = Arc::new(build_pipeline(&config, true).await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, finishing current message");
            let _ = shutdown_tx.send(true);
        }
    });

    UpdateLoop::new(source, pipeline)
        .with_batch_limit(config.telegram.batch_limit)
        .run(shutdown_rx)
        .await?;

    Ok(())
}

async fn test(
    config: Config,
    source: &str,
    message: Option<String>,
    file: Option<String>,
) -> anyhow::Result<()> {
    let text = match (message, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => anyhow::bail!("one of --message or --file is required"),
    };

    let pipeline = build_pipeline(&config, false).await?;
    let report = pipeline.test_message(&text, source).await?;
    tracing::info!(
        "Parsed {} from {}: {} target(s)",
        report.coin_pair(),
        source,
        report.signal.targets.len()
    );

    Ok(())
}

fn list_sources() -> anyhow::Result<()> {
    let registry = SourceRegistry::builtin()?;

    println!("\n📡 Registered sources:\n");
    println!("{:<24} {:<32} {:>8}", "Id", "Name", "Exchange");
    println!("{}", "-".repeat(66));
    for id in registry.ids() {
        if let Some(source) = registry.get(id) {
            println!("{:<24} {:<32} {:>8}", source.id, source.display_name, source.exchange.id());
        }
    }

    Ok(())
}

/// The currency catalog is only needed by the relevance gate, so the one-shot
/// `test` path skips loading it.
async fn build_pipeline(config: &Config, with_catalog: bool) -> anyhow::Result<SignalPipeline> {
    let bittrex = Arc::new(BittrexClient::new(
        &config.ticker.bittrex_url,
        config.ticker.timeout_secs,
    )?);

    let catalog = if !with_catalog {
        CurrencyCatalog::default()
    } else if let Some(path) = &config.catalog.path {
        let path = shellexpand::tilde(path).into_owned();
        CurrencyCatalog::from_path(&path)?
    } else {
        CurrencyCatalog::fetch(bittrex.http(), bittrex.base_url(), Exchange::Bittrex).await?
    };

    let forwarder: Arc<dyn Forwarder> = match &config.monitor.command {
        Some(command) => {
            tracing::info!("Forwarding signals to {}", command);
            Arc::new(MonitorCommand::new(command.clone()))
        }
        None => {
            tracing::warn!("monitor.command not set, signals will not be forwarded");
            Arc::new(NoopForwarder)
        }
    };

    let registry = SourceRegistry::builtin()?;
    tracing::info!("Loaded {} source definitions", registry.len());

    Ok(SignalPipeline::new(
        registry,
        catalog,
        MarketPriceLookup::new().with_client(bittrex),
        Reporter::new(forwarder),
    )
    .with_duplicate_capacity(config.pipeline.duplicate_capacity))
}
