//! Qualification rankings, raw and canonical.

use serde::{Deserialize, Serialize};

use super::keys::TeamKey;

/// A ranking export exactly as the feed delivered it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRankingTable {
    pub header: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl WinLossRecord {
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Self { wins, losses, ties }
    }
}

impl std::ops::AddAssign for WinLossRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.wins += rhs.wins;
        self.losses += rhs.losses;
        self.ties += rhs.ties;
    }
}

impl std::fmt::Display for WinLossRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// One team's canonical qualification standing.
///
/// `rank` is copied from the feed and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub rank: u32,
    pub team: TeamKey,
    /// `None` for seasons ranked without a win/loss concept.
    pub record: Option<WinLossRecord>,
    /// Present only for seasons ranked by average score.
    pub qual_average: Option<f64>,
    pub matches_played: u32,
    pub dq: u32,
    pub sort_orders: Vec<f64>,
}

/// What is known about an event's rankings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "rankings", rename_all = "snake_case")]
pub enum RankingData {
    /// No ranking table has been published yet.
    #[default]
    NotPublished,
    /// A table was published but its season layout is not understood.
    Unsupported,
    Published(Vec<Ranking>),
}

impl RankingData {
    /// Wrap the normalizer's output; an empty result means the export's
    /// format is unsupported, not that the event has no teams.
    pub fn from_normalized(rankings: Vec<Ranking>) -> Self {
        if rankings.is_empty() {
            RankingData::Unsupported
        } else {
            RankingData::Published(rankings)
        }
    }

    pub fn rankings(&self) -> &[Ranking] {
        match self {
            RankingData::Published(rankings) => rankings,
            _ => &[],
        }
    }
}
