//! Elimination bracket: series tallies, structural validity, and the
//! reconciliation of stored matches against a fresh feed snapshot.

pub mod format;
mod reconcile;
mod series;

pub use reconcile::{BracketReconciler, ReconcileError, Reconciliation};
pub use series::{Series, SeriesState, WINS_TO_DECIDE};

use fieldsync_sdk::objects::{
    AlliancePatch, Color, CompLevel, EventKey, Match, MatchKey, MatchPatch, PlayoffFormat, Roster,
    SeriesKey,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A next-round roster slot filled from its feeder series' winner rather
/// than reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeededSlot {
    pub key: MatchKey,
    pub color: Color,
}

impl SeededSlot {
    pub fn new(key: MatchKey, color: Color) -> Self {
        Self { key, color }
    }
}

/// The series view over an event's elimination matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Bracket {
    event: EventKey,
    format: PlayoffFormat,
    series: BTreeMap<SeriesKey, Series>,
}

impl Bracket {
    /// Group `matches` into series. Qualification matches are ignored.
    pub fn from_matches<'a>(
        event: EventKey,
        format: PlayoffFormat,
        matches: impl IntoIterator<Item = &'a Match>,
    ) -> Self {
        let series = matches
            .into_iter()
            .filter_map(|m| m.key.series().map(|s| (s, m.clone())))
            .into_group_map()
            .into_iter()
            .map(|(key, matches)| (key, Series::new(key, matches)))
            .collect();
        Self {
            event,
            format,
            series,
        }
    }

    pub fn event(&self) -> &EventKey {
        &self.event
    }

    pub fn format(&self) -> PlayoffFormat {
        self.format
    }

    pub fn series(&self, comp_level: CompLevel, set_number: u16) -> Option<&Series> {
        self.series.get(&SeriesKey::new(comp_level, set_number))
    }

    /// The roster that won a decided series.
    pub fn winner_of(&self, comp_level: CompLevel, set_number: u16) -> Option<&Roster> {
        self.series(comp_level, set_number)?.winner_roster()
    }

    pub fn find_match(&self, key: &MatchKey) -> Option<&Match> {
        self.series
            .get(&key.series()?)?
            .matches()
            .iter()
            .find(|m| &m.key == key)
    }

    /// Patches keeping match 1 of each next-round series in line with the
    /// winners of the series feeding it.
    ///
    /// - An empty slot is filled with the winner's roster.
    /// - A slot in `seeded` is replaced when the winner differs and cleared
    ///   when its feeder is no longer decided, as long as the match is
    ///   unplayed.
    /// - A slot the feed filled is never touched.
    pub fn advancement_patches(&self, seeded: &BTreeSet<SeededSlot>) -> Vec<MatchPatch> {
        let mut winners: BTreeMap<SeededSlot, &Roster> = BTreeMap::new();
        for series in self.series.values() {
            let Some(roster) = series.winner_roster().filter(|r| !r.is_empty()) else {
                continue;
            };
            let Some((target, color)) = format::advancement_target(self.format, series.key())
            else {
                continue;
            };
            let key = MatchKey::new(self.event.clone(), target.comp_level, target.set_number, 1);
            winners.insert(SeededSlot::new(key, color), roster);
        }

        let mut patches = Vec::new();
        for (slot, roster) in &winners {
            let current = self.find_match(&slot.key);
            let empty = current.is_none_or(|m| m.alliance(slot.color).teams.is_empty());
            let stale = seeded.contains(slot)
                && current.is_some_and(|m| {
                    !m.has_been_played() && &m.alliance(slot.color).teams != *roster
                });
            if empty || stale {
                patches.push(
                    MatchPatch::for_key(&slot.key)
                        .with_alliance(slot.color, AlliancePatch::roster(roster.iter().cloned())),
                );
            }
        }

        for slot in seeded.iter().filter(|s| !winners.contains_key(*s)) {
            let orphaned = self.find_match(&slot.key).is_some_and(|m| {
                !m.has_been_played() && !m.alliance(slot.color).teams.is_empty()
            });
            if orphaned {
                patches.push(
                    MatchPatch::for_key(&slot.key)
                        .with_alliance(slot.color, AlliancePatch::roster(std::iter::empty())),
                );
            }
        }
        patches
    }
}
