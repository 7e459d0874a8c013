//! Event system for the polling pipeline.
//!
//! # Event Flow
//!
//! 1. `PollScheduler` emits `PollTick` -> `EventSyncRunner` (one per event)
//! 2. `PollRequested` -> `PollScheduler`, which ticks the event immediately
//! 3. `EventSyncRunner` hands each non-empty `Publication` to its `Publisher`

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, PollRequestedReceiver, PollRequestedSender, PollTickReceiver,
    PollTickSender, PublicationReceiver, PublicationSender, poll_requested_channel,
    poll_tick_channel, publication_channel,
};

pub use types::{PollRequested, PollTick, Publication};
