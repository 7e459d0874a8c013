//! Event type definitions.
//!
//! Tick and request events carry only the event key; the sync processor
//! fetches the current snapshot itself. A [`Publication`] is the one event
//! that carries data: the complete outcome of a reconciliation cycle.

use crate::bracket::SeededSlot;
use fieldsync_sdk::objects::{
    AllianceSelection, EventKey, Match, MatchKey, PlayoffFormat, RankingData, TeamKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Emitted by the scheduler when an event is due for a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTick {
    pub event: EventKey,
}

/// Asks the scheduler to poll an event now instead of waiting for its
/// interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequested {
    pub event: EventKey,
}

/// One atomic batch of changes to an event's canonical state.
///
/// `None` for any optional field means unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub event: EventKey,
    pub year: u16,
    pub playoff_format: PlayoffFormat,
    pub to_upsert: Vec<Match>,
    pub to_delete: Vec<MatchKey>,
    pub rankings: Option<RankingData>,
    pub alliances: Option<AllianceSelection>,
    pub teams: Option<Vec<TeamKey>>,
    /// The full set of advancement-seeded slots after this batch.
    #[serde(default)]
    pub seeded: Option<BTreeSet<SeededSlot>>,
}

impl Publication {
    /// A publication with no changes.
    pub fn empty(event: EventKey, year: u16, playoff_format: PlayoffFormat) -> Self {
        Self {
            event,
            year,
            playoff_format,
            to_upsert: Vec::new(),
            to_delete: Vec::new(),
            rankings: None,
            alliances: None,
            teams: None,
            seeded: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_upsert.is_empty()
            && self.to_delete.is_empty()
            && self.rankings.is_none()
            && self.alliances.is_none()
            && self.teams.is_none()
            && self.seeded.is_none()
    }

    /// Teams whose status may differ after this publication.
    pub fn affected_teams(&self) -> Vec<TeamKey> {
        let mut teams: Vec<TeamKey> = self
            .to_upsert
            .iter()
            .flat_map(|m| {
                m.red
                    .teams
                    .iter()
                    .chain(m.blue.teams.iter())
                    .chain(m.red.surrogates.iter())
                    .chain(m.blue.surrogates.iter())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .chain(
                self.rankings
                    .iter()
                    .flat_map(|r| r.rankings().iter().map(|r| r.team.clone())),
            )
            .chain(self.alliances.iter().flat_map(|a| {
                a.alliances
                    .iter()
                    .flat_map(|alliance| {
                        alliance
                            .drafted()
                            .chain(alliance.backup.iter().map(|b| &b.replacement))
                            .cloned()
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            }))
            .chain(self.teams.iter().flatten().cloned())
            .collect();
        teams.sort();
        teams.dedup();
        teams
    }
}
