//! fieldsync daemon
//!
//! Polls feed snapshots for the configured events, reconciles them, and
//! appends every resulting publication to a JSON-lines log.

mod config;
mod feed;
mod pipelines;
mod publish;
mod shutdown;

use clap::Parser;
use config::ConfigLoader;
use feed::DirectoryFeed;
use fieldsync_core::config::ConfigStore;
use fieldsync_core::events::poll_requested_channel;
use fieldsync_core::processors::PollScheduler;
use fieldsync_core::{RankingNormalizer, SeasonRegistry};
use pipelines::Pipelines;
use publish::JsonLinesPublisher;
use shutdown::{shutdown_signal, spawn_signal_handler};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// fieldsync - keeps competition event data in sync with its feed
#[derive(Parser, Debug)]
#[command(name = "fieldsync-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./fieldsync.toml")]
    config: PathBuf,

    /// Override the snapshot directory
    #[arg(short, long, env = "FIELDSYNC_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting fieldsync-daemon v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.snapshot_dir));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        events = loaded_config.events.len(),
        season_overrides = loaded_config.seasons.len(),
        "Configuration loaded from {:?}",
        args.config
    );

    let normalizer = RankingNormalizer::new(Arc::new(SeasonRegistry::with_overrides(
        loaded_config.seasons,
    )));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut pipelines = Pipelines::new(
        Arc::new(DirectoryFeed::new(loaded_config.snapshot_dir)),
        Arc::new(JsonLinesPublisher::new(loaded_config.output_dir)),
        loaded_config.fetch_timeout,
        shutdown_rx.clone(),
    );
    let scheduler_config = ConfigStore::new(pipelines.apply(&loaded_config.events, &normalizer));

    let (request_tx, request_rx) = poll_requested_channel();
    let scheduler = tokio::spawn(PollScheduler::new().run(
        shutdown_rx,
        request_rx,
        scheduler_config.clone(),
        scheduler_config.subscribe(),
    ));

    let signals = spawn_signal_handler(
        pipelines,
        config_loader,
        scheduler_config,
        request_tx,
    )?;

    let result = shutdown_signal().await;

    // Stop the signal task first so no reload races the shutdown.
    signals.shutdown_notify.notify_one();
    let pipelines = signals.handle.await?;

    let _ = shutdown_tx.send(true);
    scheduler.await?;
    pipelines.join().await;
    tracing::info!("Daemon shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
