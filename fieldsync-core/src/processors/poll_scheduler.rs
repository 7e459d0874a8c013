//! PollScheduler processor.
//!
//! The PollScheduler is responsible for:
//! - Emitting `PollTick` events for each configured event at its interval
//! - Receiving `PollRequested` events via the `Processor` trait and ticking
//!   the requested event immediately
//! - Reacting to config changes by diffing active tick loops (spawning or
//!   aborting only the loops that actually changed)
//!
//! Poll cadence is configuration. The scheduler never adapts it.

use crate::config::{ConfigStore, ConfigWatcher};
use crate::events::{PollRequested, PollRequestedReceiver, PollTick, PollTickSender};
use fieldsync_sdk::objects::EventKey;
use kanau::processor::Processor;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One event the scheduler polls.
#[derive(Debug, Clone)]
pub struct PollTarget {
    pub event: EventKey,
    pub interval: Duration,
    pub tick_tx: PollTickSender,
}

impl PollTarget {
    pub fn new(event: EventKey, interval: Duration, tick_tx: PollTickSender) -> Self {
        Self {
            event,
            interval,
            tick_tx,
        }
    }

    /// Same event, same cadence, same destination.
    fn same_as(&self, other: &PollTarget) -> bool {
        self.event == other.event
            && self.interval == other.interval
            && self.tick_tx.same_channel(&other.tick_tx)
    }
}

/// Held inside a [`ConfigStore`] so the target list can be swapped at runtime.
#[derive(Debug, Clone, Default)]
pub struct PollSchedulerConfig {
    pub targets: Vec<PollTarget>,
}

/// Schedules polling for every configured event.
///
/// All signal receivers are injected when calling
/// [`run()`](PollScheduler::run) rather than owned by the struct.
pub struct PollScheduler {
    /// Notifies tick loops of immediate poll requests.
    request_tx: broadcast::Sender<EventKey>,
}

impl PollScheduler {
    pub fn new() -> Self {
        let (request_tx, _) = broadcast::channel(64);
        Self { request_tx }
    }

    /// Run the PollScheduler until shutdown is signaled.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut request_rx: PollRequestedReceiver,
        config_store: ConfigStore<PollSchedulerConfig>,
        mut config_watcher: ConfigWatcher<PollSchedulerConfig>,
    ) {
        let mut active_tasks: Vec<(PollTarget, JoinHandle<()>)> = Vec::new();
        {
            let config = config_store.read();
            self.apply_diff(&mut active_tasks, &config);
            info!(events = active_tasks.len(), "PollScheduler started");
        }

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("PollScheduler received shutdown signal");
                        break;
                    }
                }

                Ok(()) = config_watcher.changed() => {
                    let config = config_watcher.latest();
                    self.apply_diff(&mut active_tasks, &config);
                    info!(events = active_tasks.len(), "PollScheduler reconciled config");
                }

                Some(request) = request_rx.recv() => {
                    let _ = self.process(request).await;
                }

                else => {
                    info!("PollRequested channel closed");
                    break;
                }
            }
        }

        for (_, handle) in active_tasks {
            handle.abort();
        }

        info!("PollScheduler shutdown complete");
    }

    /// Abort loops whose target is gone or changed, then spawn loops for
    /// targets not yet running.
    fn apply_diff(
        &self,
        active: &mut Vec<(PollTarget, JoinHandle<()>)>,
        new_config: &PollSchedulerConfig,
    ) {
        active.retain(|(target, handle)| {
            let keep = new_config.targets.iter().any(|t| t.same_as(target));
            if !keep {
                info!(event = %target.event, "Aborting removed tick loop");
                handle.abort();
            }
            keep
        });

        for target in &new_config.targets {
            if !active.iter().any(|(t, _)| t.same_as(target)) {
                info!(
                    event = %target.event,
                    interval_secs = target.interval.as_secs(),
                    "Spawning new tick loop"
                );
                let handle = self.spawn_tick_loop(target.clone());
                active.push((target.clone(), handle));
            }
        }
    }

    /// Tick on spawn, then once per interval, and immediately on request. A
    /// requested poll restarts the interval.
    fn spawn_tick_loop(&self, target: PollTarget) -> JoinHandle<()> {
        let mut request_rx = self.request_tx.subscribe();
        let PollTarget {
            event,
            interval,
            tick_tx,
        } = target;

        tokio::spawn(async move {
            let mut deadline = Instant::now();

            loop {
                tokio::select! {
                    biased;

                    Ok(requested) = request_rx.recv() => {
                        if requested != event {
                            continue;
                        }
                        debug!(%event, "Poll requested");
                    }

                    _ = tokio::time::sleep_until(deadline) => {}
                }

                deadline = Instant::now() + interval;
                let tick = PollTick {
                    event: event.clone(),
                };
                if let Err(e) = tick_tx.send(tick).await {
                    warn!(%event, error = %e, "Failed to send PollTick, receiver dropped");
                    return;
                }
                debug!(%event, "Emitted PollTick");
            }
        })
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor<PollRequested> for PollScheduler {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, request: PollRequested) -> Result<(), Infallible> {
        debug!(event = %request.event, "Received PollRequested");
        // Nobody listening means the event is not scheduled.
        if self.request_tx.send(request.event.clone()).is_err() {
            warn!(event = %request.event, "PollRequested for an event with no tick loop");
        }
        Ok(())
    }
}
