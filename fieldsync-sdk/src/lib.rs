#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Canonical objects for competition event data.
//!
//! `objects` holds the wire types exchanged with feed, persistence, and
//! presentation collaborators. `config` holds the season layout shapes the
//! ranking normalizer is configured with.

pub mod config;
pub mod objects;
