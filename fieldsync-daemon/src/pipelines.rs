//! One sync runner per configured event.
//!
//! The set of running pipelines follows the configured event list: new
//! events get a runner with fresh state, removed events lose theirs, and an
//! event whose season or playoff format changed is restarted from scratch.
//! Poll interval changes are left to the scheduler.

use crate::config::file::EventConfig;
use crate::feed::DirectoryFeed;
use crate::publish::JsonLinesPublisher;
use fieldsync_core::events::{PollTickSender, poll_tick_channel};
use fieldsync_core::processors::{EventSync, EventSyncRunner, PollSchedulerConfig, PollTarget};
use fieldsync_core::{EventState, RankingNormalizer};
use fieldsync_sdk::objects::{EventKey, PlayoffFormat};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct Pipeline {
    year: u16,
    playoff_format: PlayoffFormat,
    tick_tx: PollTickSender,
    handle: JoinHandle<()>,
}

pub struct Pipelines {
    feed: Arc<DirectoryFeed>,
    publisher: Arc<JsonLinesPublisher>,
    fetch_timeout: Duration,
    shutdown_rx: watch::Receiver<bool>,
    active: BTreeMap<EventKey, Pipeline>,
}

impl Pipelines {
    pub fn new(
        feed: Arc<DirectoryFeed>,
        publisher: Arc<JsonLinesPublisher>,
        fetch_timeout: Duration,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            feed,
            publisher,
            fetch_timeout,
            shutdown_rx,
            active: BTreeMap::new(),
        }
    }

    /// Bring the running pipelines in line with `events` and return the
    /// scheduler targets that drive them.
    ///
    /// Removed pipelines are not aborted: a runner stops once both our
    /// sender and the scheduler's tick loop let go of its channel.
    pub fn apply(
        &mut self,
        events: &[EventConfig],
        normalizer: &RankingNormalizer,
    ) -> PollSchedulerConfig {
        self.active.retain(|key, _| {
            let keep = events.iter().any(|e| &e.key == key);
            if !keep {
                info!(event = %key, "Stopping pipeline for removed event");
            }
            keep
        });

        for event in events {
            let Some(year) = event.season() else {
                warn!(event = %event.key, "Event has no season year, skipping");
                continue;
            };
            if let Some(existing) = self.active.get(&event.key) {
                if existing.year == year && existing.playoff_format == event.playoff_format {
                    continue;
                }
                info!(event = %event.key, year, "Event identity changed, restarting pipeline");
                existing.handle.abort();
            }
            let pipeline = self.spawn(event, year, normalizer);
            self.active.insert(event.key.clone(), pipeline);
        }

        let targets = events
            .iter()
            .filter_map(|event| {
                self.active.get(&event.key).map(|pipeline| {
                    PollTarget::new(
                        event.key.clone(),
                        Duration::from_secs(event.poll_interval_secs),
                        pipeline.tick_tx.clone(),
                    )
                })
            })
            .collect();
        PollSchedulerConfig { targets }
    }

    fn spawn(&self, event: &EventConfig, year: u16, normalizer: &RankingNormalizer) -> Pipeline {
        let (tick_tx, tick_rx) = poll_tick_channel();
        let state = EventState::new(event.key.clone(), year, event.playoff_format);
        let runner = EventSyncRunner::new(
            EventSync::new(state, normalizer.clone()),
            Arc::clone(&self.feed),
            Arc::clone(&self.publisher),
            self.fetch_timeout,
            tick_rx,
            self.shutdown_rx.clone(),
        );
        info!(event = %event.key, year, "Starting event pipeline");
        Pipeline {
            year,
            playoff_format: event.playoff_format,
            tick_tx,
            handle: tokio::spawn(runner.run()),
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &EventKey> {
        self.active.keys()
    }

    /// Wait for every runner to finish. Call after shutdown is signaled.
    pub async fn join(self) {
        for (event, pipeline) in self.active {
            drop(pipeline.tick_tx);
            if let Err(e) = pipeline.handle.await {
                warn!(%event, error = %e, "Event pipeline ended abnormally");
            }
        }
    }
}
