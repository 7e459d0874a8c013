//! The feed snapshot consumed by one reconciliation cycle.

use serde::{Deserialize, Serialize};

use super::alliances::AllianceSelection;
use super::keys::{EventKey, TeamKey};
use super::matches::MatchPatch;
use super::rankings::RawRankingTable;

/// The elimination format an event declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffFormat {
    #[serde(rename = "bracket_2_team")]
    Bracket2Team,
    #[serde(rename = "bracket_4_team")]
    Bracket4Team,
    #[default]
    #[serde(rename = "bracket_8_team")]
    Bracket8Team,
    #[serde(rename = "bracket_16_team")]
    Bracket16Team,
    /// No structural constraint on levels or set numbers.
    Custom,
}

/// Everything the feed currently reports for one event.
///
/// Absent rankings or alliances mean the feed did not report them this cycle;
/// previously reconciled values are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub event: EventKey,
    pub year: u16,
    #[serde(default)]
    pub playoff_format: PlayoffFormat,
    #[serde(default)]
    pub teams: Vec<TeamKey>,
    #[serde(default)]
    pub matches: Vec<MatchPatch>,
    #[serde(default)]
    pub rankings: Option<RawRankingTable>,
    #[serde(default)]
    pub alliances: Option<AllianceSelection>,
    /// The feed schedules next-round matches itself; placeholder rosters
    /// must not be synthesized.
    #[serde(default)]
    pub schedules_advancement: bool,
}

impl FeedSnapshot {
    pub fn new(event: EventKey, year: u16, playoff_format: PlayoffFormat) -> Self {
        Self {
            event,
            year,
            playoff_format,
            teams: Vec::new(),
            matches: Vec::new(),
            rankings: None,
            alliances: None,
            schedules_advancement: false,
        }
    }
}
