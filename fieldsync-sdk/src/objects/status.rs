//! Per-team status at an event.
//!
//! These objects are always derived from the canonical event state and are
//! never persisted. Every field a rendered sentence depends on is exposed
//! here, so presentation layers can re-render without re-deriving.

use serde::{Deserialize, Serialize};

use super::keys::TeamKey;
use super::matches::{CompLevel, MatchKey};
use super::rankings::{Ranking, WinLossRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEventStatus {
    pub team: TeamKey,
    /// The team is on the event's registered team list.
    pub registered: bool,
    pub qual: Option<QualStatus>,
    pub alliance: Option<AllianceStatus>,
    pub playoff: Option<PlayoffStatus>,
    pub last_match: Option<MatchKey>,
    pub next_match: Option<MatchKey>,
}

impl TeamEventStatus {
    /// A status with no participation data at all.
    pub fn minimal(team: TeamKey, registered: bool) -> Self {
        Self {
            team,
            registered,
            qual: None,
            alliance: None,
            playoff: None,
            last_match: None,
            next_match: None,
        }
    }
}

/// Whether a sub-status can still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualStatus {
    pub phase: Phase,
    /// Number of ranked teams, when rankings are published.
    pub num_teams: Option<u32>,
    pub standing: QualStanding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "ranking", rename_all = "snake_case")]
pub enum QualStanding {
    /// Rankings have not been computed yet.
    Pending,
    /// Rankings exist but this season's export format is not understood.
    Unsupported,
    Ranked(Ranking),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "pick", rename_all = "snake_case")]
pub enum AllianceRole {
    Captain,
    /// 1-based pick number.
    Pick(u8),
    BackupIn,
    BackupOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceStatus {
    /// 1-based alliance number in selection order.
    pub number: u16,
    pub name: String,
    pub role: AllianceRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffState {
    NotStarted,
    Playing,
    Eliminated,
    Won,
}

impl std::fmt::Display for PlayoffState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayoffState::NotStarted => write!(f, "not_started"),
            PlayoffState::Playing => write!(f, "playing"),
            PlayoffState::Eliminated => write!(f, "eliminated"),
            PlayoffState::Won => write!(f, "won"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffStatus {
    pub status: PlayoffState,
    /// The highest level the alliance has reached; absent before any match.
    pub level: Option<CompLevel>,
    pub current_level_record: Option<WinLossRecord>,
    /// Cumulative record across every level reached.
    pub record: Option<WinLossRecord>,
    pub playoff_average: Option<f64>,
}

impl PlayoffStatus {
    pub fn not_started() -> Self {
        Self {
            status: PlayoffState::NotStarted,
            level: None,
            current_level_record: None,
            record: None,
            playoff_average: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.status, PlayoffState::Eliminated | PlayoffState::Won)
    }
}
