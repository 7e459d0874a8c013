#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Reconciliation engine for season-versioned competition data.
//!
//! Raw feed snapshots go in; normalized rankings, a reconciled elimination
//! bracket, and per-team statuses come out. Everything here is in memory;
//! fetching and persistence sit behind the traits in [`processors`].

pub mod bracket;
pub mod config;
pub mod events;
pub mod processors;
pub mod rankings;
pub mod seasons;
pub mod state;
pub mod status;

pub use bracket::{Bracket, BracketReconciler, ReconcileError, Reconciliation, SeededSlot};
pub use rankings::{RankingNormalizer, normalize};
pub use seasons::SeasonRegistry;
pub use state::EventState;
pub use status::{describe, generate_status};
