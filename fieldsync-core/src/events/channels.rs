//! Event channel factories and handles.

use super::types::{PollRequested, PollTick, Publication};
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender for PollTick events (PollScheduler -> EventSyncRunner).
pub type PollTickSender = mpsc::Sender<PollTick>;
/// Receiver for PollTick events.
pub type PollTickReceiver = mpsc::Receiver<PollTick>;

/// Sender for PollRequested events (any caller -> PollScheduler).
pub type PollRequestedSender = mpsc::Sender<PollRequested>;
/// Receiver for PollRequested events.
pub type PollRequestedReceiver = mpsc::Receiver<PollRequested>;

/// Sender for Publication events (ChannelPublisher -> downstream consumer).
pub type PublicationSender = mpsc::Sender<Publication>;
/// Receiver for Publication events.
pub type PublicationReceiver = mpsc::Receiver<Publication>;

/// Create a new PollTick channel.
///
/// Each event's sync runner owns the receiving end of its own channel.
pub fn poll_tick_channel() -> (PollTickSender, PollTickReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new PollRequested channel.
pub fn poll_requested_channel() -> (PollRequestedSender, PollRequestedReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new Publication channel.
pub fn publication_channel() -> (PublicationSender, PublicationReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
