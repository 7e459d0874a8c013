//! Signal handling for graceful shutdown, config reload, and on-demand polls.

use crate::config::ConfigLoader;
use crate::pipelines::Pipelines;
use fieldsync_core::config::ConfigStore;
use fieldsync_core::events::{PollRequested, PollRequestedSender};
use fieldsync_core::processors::PollSchedulerConfig;
use fieldsync_core::{RankingNormalizer, SeasonRegistry};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
    Ok(())
}

/// Handles to the running signal task.
pub struct SignalTask {
    pub shutdown_notify: Arc<Notify>,
    /// Hands the pipelines back once the task stops.
    pub handle: JoinHandle<Pipelines>,
}

/// Spawns a task that owns the event pipelines and reacts to:
///
/// - SIGHUP: reload the configuration, then reconcile the pipelines and the
///   scheduler's targets with the new event list. Directories and the fetch
///   timeout are read at startup only.
/// - SIGUSR1: request an immediate poll of every running event.
pub fn spawn_signal_handler(
    mut pipelines: Pipelines,
    config_loader: Arc<ConfigLoader>,
    scheduler_config: ConfigStore<PollSchedulerConfig>,
    request_tx: PollRequestedSender,
) -> std::io::Result<SignalTask> {
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded) => {
                            let normalizer = RankingNormalizer::new(Arc::new(
                                SeasonRegistry::with_overrides(loaded.seasons),
                            ));
                            let targets = pipelines.apply(&loaded.events, &normalizer);
                            scheduler_config.update(targets);
                            tracing::info!(
                                events = loaded.events.len(),
                                "Configuration reloaded successfully"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload configuration");
                        }
                    }
                }
                _ = sigusr1.recv() => {
                    tracing::info!("Received SIGUSR1, polling all events now");
                    for event in pipelines.events() {
                        let request = PollRequested { event: event.clone() };
                        if request_tx.send(request).await.is_err() {
                            tracing::warn!("PollScheduler is gone, ignoring poll request");
                            break;
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Signal handler shutting down");
                    break;
                }
            }
        }
        pipelines
    });

    Ok(SignalTask {
        shutdown_notify,
        handle,
    })
}
