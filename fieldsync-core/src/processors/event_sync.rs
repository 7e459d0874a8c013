//! EventSync processor.
//!
//! The EventSync is responsible for:
//! - Turning a `FeedSnapshot` into one `Publication`, computed fully in
//!   memory: rankings normalized, matches reconciled, advancement applied
//! - Holding the event's canonical `EventState`
//!
//! The `EventSyncRunner` wraps it with I/O:
//! - Receiving `PollTick` events
//! - Fetching a snapshot through a `FeedFetcher`, under a timeout
//! - Publishing through a `Publisher`, then committing to the state
//!
//! A failed fetch, a timeout, or a failed publish leaves the state as it was.
//! Each event has its own EventSync and runner.

use crate::bracket::{BracketReconciler, ReconcileError, Reconciliation, SeededSlot};
use crate::events::{PollTickReceiver, Publication, PublicationSender};
use crate::rankings::RankingNormalizer;
use crate::state::EventState;
use async_trait::async_trait;
use fieldsync_sdk::objects::{
    Color, CompLevel, EventKey, FeedSnapshot, MatchKey, MatchPatch, RankingData,
};
use kanau::processor::Processor;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, warn};

/// Errors a feed fetcher reports.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no snapshot available for event {0}")]
    NotFound(EventKey),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors a publisher reports.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("publication encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("publication channel closed")]
    ChannelClosed,
}

/// Errors that can occur during one sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("snapshot for {found} delivered to the sync of {expected}")]
    ForeignSnapshot { expected: EventKey, found: EventKey },

    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

/// Supplies the feed's current snapshot of an event.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, event: &EventKey) -> Result<FeedSnapshot, FetchError>;
}

/// Receives each publication together with the state it produces.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, publication: &Publication, state: &EventState)
    -> Result<(), PublishError>;
}

/// Forwards publications into a channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: PublicationSender,
}

impl ChannelPublisher {
    pub fn new(tx: PublicationSender) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(
        &self,
        publication: &Publication,
        _state: &EventState,
    ) -> Result<(), PublishError> {
        self.tx
            .send(publication.clone())
            .await
            .map_err(|_| PublishError::ChannelClosed)
    }
}

/// Owns one event's canonical state.
pub struct EventSync {
    state: RwLock<EventState>,
    normalizer: RankingNormalizer,
}

impl EventSync {
    pub fn new(state: EventState, normalizer: RankingNormalizer) -> Self {
        Self {
            state: RwLock::new(state),
            normalizer,
        }
    }

    pub async fn event(&self) -> EventKey {
        self.state.read().await.event.clone()
    }

    /// A copy of the committed state.
    pub async fn state(&self) -> EventState {
        self.state.read().await.clone()
    }

    /// The committed state with `publication` applied, without committing it.
    pub async fn preview(&self, publication: &Publication) -> EventState {
        let mut next = self.state.read().await.clone();
        next.apply(publication);
        next
    }

    /// Replace the committed state.
    pub async fn commit(&self, next: EventState) {
        *self.state.write().await = next;
    }
}

impl Processor<FeedSnapshot> for EventSync {
    type Output = Publication;
    type Error = SyncError;

    async fn process(&self, snapshot: FeedSnapshot) -> Result<Publication, SyncError> {
        let state = self.state.read().await;
        if snapshot.event != state.event {
            return Err(SyncError::ForeignSnapshot {
                expected: state.event.clone(),
                found: snapshot.event,
            });
        }

        let reconciler = BracketReconciler::new(snapshot.event.clone(), snapshot.playoff_format);
        let incoming = snapshot.matches.clone();
        let mut reconciliation = reconciler.reconcile(&state.matches, &incoming)?;
        let seeded = if snapshot.schedules_advancement {
            BTreeSet::new()
        } else {
            seed_advancement(&reconciler, &state, &snapshot, incoming, &mut reconciliation)?
        };

        let rankings = snapshot
            .rankings
            .as_ref()
            .map(|table| {
                RankingData::from_normalized(self.normalizer.normalize(snapshot.year, table))
            })
            .filter(|rankings| rankings != &state.rankings);
        let alliances = snapshot
            .alliances
            .clone()
            .filter(|alliances| state.alliances.as_ref() != Some(alliances));
        let teams = Some(snapshot.teams.clone())
            .filter(|teams| !teams.is_empty() && teams != &state.teams);

        Ok(Publication {
            event: snapshot.event,
            year: snapshot.year,
            playoff_format: snapshot.playoff_format,
            to_upsert: reconciliation.to_upsert,
            to_delete: reconciliation.to_delete,
            rankings,
            alliances,
            teams,
            seeded: Some(seeded).filter(|seeded| seeded != &state.seeded),
        })
    }
}

/// Fill, replace, or clear next-round slots from the current series winners
/// until the bracket settles, and return the slots seeded afterwards.
///
/// A slot the snapshot reports teams for belongs to the feed from then on.
/// A match that only existed to hold seeded slots and ends up with neither
/// roster is dropped.
fn seed_advancement(
    reconciler: &BracketReconciler,
    state: &EventState,
    snapshot: &FeedSnapshot,
    mut incoming: Vec<MatchPatch>,
    reconciliation: &mut Reconciliation,
) -> Result<BTreeSet<SeededSlot>, ReconcileError> {
    let event = &snapshot.event;
    let reported: BTreeSet<MatchKey> =
        snapshot.matches.iter().map(|p| p.match_key(event)).collect();
    let feed_owned = |slot: &SeededSlot| {
        snapshot.matches.iter().any(|p| {
            p.match_key(event) == slot.key
                && p.alliance(slot.color).is_some_and(|a| a.teams.is_some())
        })
    };

    let mut seeded: BTreeSet<SeededSlot> = state
        .seeded
        .iter()
        .filter(|s| !feed_owned(s))
        .cloned()
        .collect();
    let mut touched: BTreeSet<MatchKey> = BTreeSet::new();

    // Each pass can seed at most one further level.
    for _ in 0..CompLevel::ELIMINATION_DESC.len() {
        let patches = reconciliation.bracket.advancement_patches(&seeded);
        if patches.is_empty() {
            break;
        }
        debug!(
            %event,
            patches = patches.len(),
            "Seeding next-round matches from series winners"
        );
        for patch in &patches {
            let key = patch.match_key(event);
            for color in Color::ALL {
                let teams = patch.alliance(color).and_then(|a| a.teams.as_ref());
                if teams.is_some_and(|t| !t.is_empty()) {
                    seeded.insert(SeededSlot::new(key.clone(), color));
                }
            }
            touched.insert(key);
        }
        incoming.extend(patches);
        *reconciliation = reconciler.reconcile(&state.matches, &incoming)?;
    }

    let orphans: BTreeSet<MatchKey> = touched
        .into_iter()
        .filter(|key| !reported.contains(key))
        .filter(|key| {
            reconciliation.bracket.find_match(key).is_none_or(|m| {
                !m.has_been_played() && m.red.teams.is_empty() && m.blue.teams.is_empty()
            })
        })
        .collect();
    reconciliation.to_upsert.retain(|m| !orphans.contains(&m.key));
    for key in orphans {
        if state.matches.contains_key(&key) && !reconciliation.to_delete.contains(&key) {
            info!(%event, match_key = %key, "Removing emptied advancement placeholder");
            reconciliation.to_delete.push(key);
        }
    }

    seeded.retain(|slot| {
        reconciliation
            .bracket
            .find_match(&slot.key)
            .is_some_and(|m| !m.alliance(slot.color).teams.is_empty())
    });
    Ok(seeded)
}

/// What one poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Unchanged,
    Published { upserted: usize, deleted: usize },
}

/// Runner for one event's EventSync.
pub struct EventSyncRunner<F: FeedFetcher, P: Publisher> {
    sync: EventSync,
    fetcher: Arc<F>,
    publisher: Arc<P>,
    fetch_timeout: Duration,
    tick_rx: PollTickReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl<F: FeedFetcher + 'static, P: Publisher + 'static> EventSyncRunner<F, P> {
    pub fn new(
        sync: EventSync,
        fetcher: Arc<F>,
        publisher: Arc<P>,
        fetch_timeout: Duration,
        tick_rx: PollTickReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            sync,
            fetcher,
            publisher,
            fetch_timeout,
            tick_rx,
            shutdown_rx,
        }
    }

    pub fn sync(&self) -> &EventSync {
        &self.sync
    }

    /// Run the EventSyncRunner.
    pub async fn run(mut self) {
        let event = self.sync.event().await;
        info!(%event, "EventSyncRunner started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!(%event, "EventSyncRunner shutting down");
                        break;
                    }
                }

                Some(tick) = self.tick_rx.recv() => {
                    if tick.event != event {
                        warn!(
                            expected_event = %event,
                            received_event = %tick.event,
                            "Received mismatched PollTick"
                        );
                        continue;
                    }

                    match self.poll_once().await {
                        Ok(PollOutcome::Unchanged) => {
                            debug!(%event, "Snapshot unchanged");
                        }
                        Ok(PollOutcome::Published { upserted, deleted }) => {
                            info!(%event, upserted, deleted, "Publication committed");
                        }
                        Err(e) => {
                            error!(%event, error = %e, "Sync failed; state left untouched");
                        }
                    }
                }

                else => {
                    info!(%event, "PollTick channel closed");
                    break;
                }
            }
        }

        info!(%event, "EventSyncRunner shutdown complete");
    }

    /// Fetch, reconcile, publish, and commit once.
    pub async fn poll_once(&self) -> Result<PollOutcome, SyncError> {
        let event = self.sync.event().await;
        let snapshot = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&event))
            .await
            .map_err(|_| SyncError::Timeout(self.fetch_timeout))??;

        let publication = self.sync.process(snapshot).await?;
        if publication.is_empty() {
            return Ok(PollOutcome::Unchanged);
        }

        let next = self.sync.preview(&publication).await;
        self.publisher.publish(&publication, &next).await?;
        self.sync.commit(next).await;

        Ok(PollOutcome::Published {
            upserted: publication.to_upsert.len(),
            deleted: publication.to_delete.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{poll_tick_channel, publication_channel};
    use fieldsync_sdk::objects::{
        AlliancePatch, PlayoffFormat, PlayoffState, RawRankingTable, TeamKey, WinLossRecord,
    };
    use std::sync::Mutex;

    fn event() -> EventKey {
        EventKey::new("2019casj")
    }

    fn roster(teams: [&str; 3]) -> impl Iterator<Item = TeamKey> {
        teams.into_iter().map(TeamKey::new)
    }

    fn snapshot() -> FeedSnapshot {
        let qf = |n| MatchKey::new(event(), CompLevel::Quarter, 1, n);
        let mut snapshot = FeedSnapshot::new(event(), 2019, PlayoffFormat::Bracket8Team);
        snapshot.teams = vec![TeamKey::new("254"), TeamKey::new("604")];
        snapshot.matches = vec![
            MatchPatch::for_key(&qf(1))
                .with_alliance(Color::Red, AlliancePatch::scored(roster(["254", "1678", "973"]), 200))
                .with_alliance(Color::Blue, AlliancePatch::scored(roster(["604", "115", "5499"]), 100)),
            MatchPatch::for_key(&qf(2))
                .with_alliance(Color::Red, AlliancePatch::scored(roster(["254", "1678", "973"]), 180))
                .with_alliance(Color::Blue, AlliancePatch::scored(roster(["604", "115", "5499"]), 90)),
        ];
        snapshot
    }

    enum Feed {
        Snapshot(FeedSnapshot),
        Fail,
        Hang,
    }

    struct StaticFeed(Mutex<Feed>);

    impl StaticFeed {
        fn new(feed: Feed) -> Arc<Self> {
            Arc::new(Self(Mutex::new(feed)))
        }

        fn set(&self, feed: Feed) {
            *self.0.lock().unwrap() = feed;
        }
    }

    #[async_trait]
    impl FeedFetcher for StaticFeed {
        async fn fetch(&self, event: &EventKey) -> Result<FeedSnapshot, FetchError> {
            let result = match &*self.0.lock().unwrap() {
                Feed::Snapshot(s) => Some(Ok(s.clone())),
                Feed::Fail => Some(Err(FetchError::NotFound(event.clone()))),
                Feed::Hang => None,
            };
            match result {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }
    }

    struct FlakyPublisher {
        fail: Mutex<bool>,
        published: Mutex<Vec<Publication>>,
    }

    #[async_trait]
    impl Publisher for FlakyPublisher {
        async fn publish(
            &self,
            publication: &Publication,
            _state: &EventState,
        ) -> Result<(), PublishError> {
            if *self.fail.lock().unwrap() {
                return Err(PublishError::ChannelClosed);
            }
            self.published.lock().unwrap().push(publication.clone());
            Ok(())
        }
    }

    fn runner(
        feed: Arc<StaticFeed>,
        publisher: Arc<FlakyPublisher>,
    ) -> EventSyncRunner<StaticFeed, FlakyPublisher> {
        let (_tick_tx, tick_rx) = poll_tick_channel();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = EventState::new(event(), 2019, PlayoffFormat::Bracket8Team);
        EventSyncRunner::new(
            EventSync::new(state, RankingNormalizer::default()),
            feed,
            publisher,
            Duration::from_millis(50),
            tick_rx,
            shutdown_rx,
        )
    }

    fn publisher(fail: bool) -> Arc<FlakyPublisher> {
        Arc::new(FlakyPublisher {
            fail: Mutex::new(fail),
            published: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_process_seeds_advancement() {
        let sync = EventSync::new(
            EventState::new(event(), 2019, PlayoffFormat::Bracket8Team),
            RankingNormalizer::default(),
        );
        let publication = sync.process(snapshot()).await.unwrap();
        let sf1 = MatchKey::new(event(), CompLevel::Semi, 1, 1);
        let seeded = publication
            .to_upsert
            .iter()
            .find(|m| m.key == sf1)
            .unwrap();
        assert_eq!(seeded.red.teams[0], TeamKey::new("254"));
        assert!(seeded.blue.teams.is_empty());
        assert_eq!(publication.teams.as_ref().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_corrected_feeder_clears_seeded_slot() {
        let feed = StaticFeed::new(Feed::Snapshot(snapshot()));
        let publisher = publisher(false);
        let runner = runner(feed.clone(), publisher.clone());
        let sf1 = MatchKey::new(event(), CompLevel::Semi, 1, 1);

        runner.poll_once().await.unwrap();
        let state = runner.sync().state().await;
        assert!(state.seeded.contains(&SeededSlot::new(sf1.clone(), Color::Red)));

        // The feed corrects game 2 of the quarterfinal: the series is 1-1 again.
        let mut corrected = snapshot();
        corrected.matches[1] = MatchPatch::for_key(&MatchKey::new(event(), CompLevel::Quarter, 1, 2))
            .with_alliance(Color::Red, AlliancePatch::scored(roster(["254", "1678", "973"]), 90))
            .with_alliance(Color::Blue, AlliancePatch::scored(roster(["604", "115", "5499"]), 180));
        feed.set(Feed::Snapshot(corrected));

        assert_eq!(
            runner.poll_once().await.unwrap(),
            PollOutcome::Published { upserted: 1, deleted: 1 }
        );
        let publication = publisher.published.lock().unwrap().last().cloned().unwrap();
        assert_eq!(publication.to_delete, vec![sf1.clone()]);
        assert_eq!(publication.seeded, Some(BTreeSet::new()));

        let state = runner.sync().state().await;
        assert!(!state.matches.contains_key(&sf1));
        assert!(state.seeded.is_empty());
        let playoff = state.status(&TeamKey::new("254")).playoff.unwrap();
        assert_eq!(playoff.status, PlayoffState::Playing);
        assert_eq!(playoff.level, Some(CompLevel::Quarter));
        assert_eq!(playoff.current_level_record, Some(WinLossRecord::new(1, 1, 0)));

        // A further identical poll changes nothing.
        assert_eq!(runner.poll_once().await.unwrap(), PollOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_feed_reported_slot_is_not_reseeded() {
        let sync = EventSync::new(
            EventState::new(event(), 2019, PlayoffFormat::Bracket8Team),
            RankingNormalizer::default(),
        );
        sync.commit(sync.preview(&sync.process(snapshot()).await.unwrap()).await)
            .await;

        // The feed now schedules the semifinal itself, with a different red roster.
        let mut scheduled = snapshot();
        scheduled.matches.push(
            MatchPatch::for_key(&MatchKey::new(event(), CompLevel::Semi, 1, 1))
                .with_alliance(Color::Red, AlliancePatch::roster(roster(["254", "1678", "199"]))),
        );
        let publication = sync.process(scheduled).await.unwrap();
        assert_eq!(publication.seeded, Some(BTreeSet::new()));
        let semi = &publication.to_upsert[0];
        assert_eq!(semi.red.teams[2], TeamKey::new("199"));
    }

    #[tokio::test]
    async fn test_feed_scheduled_advancement_is_not_synthesized() {
        let sync = EventSync::new(
            EventState::new(event(), 2019, PlayoffFormat::Bracket8Team),
            RankingNormalizer::default(),
        );
        let mut snapshot = snapshot();
        snapshot.schedules_advancement = true;
        let publication = sync.process(snapshot).await.unwrap();
        assert_eq!(publication.to_upsert.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_snapshot_rejected() {
        let sync = EventSync::new(
            EventState::new(event(), 2019, PlayoffFormat::Bracket8Team),
            RankingNormalizer::default(),
        );
        let other = FeedSnapshot::new(EventKey::new("2019cada"), 2019, PlayoffFormat::Bracket8Team);
        assert!(matches!(
            sync.process(other).await,
            Err(SyncError::ForeignSnapshot { .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_poll_publishes_once() {
        let feed = StaticFeed::new(Feed::Snapshot(snapshot()));
        let publisher = publisher(false);
        let runner = runner(feed, publisher.clone());

        assert!(matches!(
            runner.poll_once().await.unwrap(),
            PollOutcome::Published { upserted: 3, deleted: 0 }
        ));
        assert_eq!(runner.poll_once().await.unwrap(), PollOutcome::Unchanged);
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_leave_state_untouched() {
        let feed = StaticFeed::new(Feed::Fail);
        let publisher = publisher(false);
        let runner = runner(feed.clone(), publisher.clone());
        let initial = runner.sync().state().await;

        assert!(matches!(runner.poll_once().await, Err(SyncError::Fetch(_))));
        assert_eq!(runner.sync().state().await, initial);

        feed.set(Feed::Hang);
        assert!(matches!(runner.poll_once().await, Err(SyncError::Timeout(_))));
        assert_eq!(runner.sync().state().await, initial);

        feed.set(Feed::Snapshot(snapshot()));
        *publisher.fail.lock().unwrap() = true;
        assert!(matches!(runner.poll_once().await, Err(SyncError::Publish(_))));
        assert_eq!(runner.sync().state().await, initial);

        *publisher.fail.lock().unwrap() = false;
        runner.poll_once().await.unwrap();
        assert_eq!(runner.sync().state().await.matches.len(), 3);
    }

    #[tokio::test]
    async fn test_unsupported_rankings_published_once() {
        let sync = EventSync::new(
            EventState::new(event(), 2021, PlayoffFormat::Bracket8Team),
            RankingNormalizer::default(),
        );
        let mut snapshot = FeedSnapshot::new(event(), 2021, PlayoffFormat::Bracket8Team);
        snapshot.rankings = Some(RawRankingTable {
            header: vec!["Rank".to_owned(), "Team".to_owned()],
            rows: vec![vec!["1".to_owned(), "254".to_owned()]],
        });
        let publication = sync.process(snapshot.clone()).await.unwrap();
        assert_eq!(publication.rankings, Some(RankingData::Unsupported));

        sync.commit(sync.preview(&publication).await).await;
        assert!(sync.process(snapshot).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_channel_publisher_forwards() {
        let (tx, mut rx) = publication_channel();
        let publisher = ChannelPublisher::new(tx);
        let state = EventState::new(event(), 2019, PlayoffFormat::Bracket8Team);
        let publication = Publication::empty(event(), 2019, PlayoffFormat::Bracket8Team);
        publisher.publish(&publication, &state).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), publication);
    }
}
