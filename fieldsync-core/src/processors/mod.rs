//! Event processors for the polling pipeline.
//!
//! - `PollScheduler`: emits `PollTick` per event, receives `PollRequested`
//! - `EventSync`: turns a `FeedSnapshot` into a `Publication`
//! - `EventSyncRunner`: receives `PollTick`, fetches, publishes, commits

pub mod event_sync;
pub mod poll_scheduler;

pub use event_sync::{
    ChannelPublisher, EventSync, EventSyncRunner, FeedFetcher, FetchError, PollOutcome,
    PublishError, Publisher, SyncError,
};
pub use poll_scheduler::{PollScheduler, PollSchedulerConfig, PollTarget};
