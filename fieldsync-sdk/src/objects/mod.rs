pub mod alliances;
pub mod keys;
pub mod matches;
pub mod rankings;
pub mod snapshot;
pub mod status;

pub use alliances::{Alliance, AllianceSelection, BackupSwap};
pub use keys::{EventKey, TeamKey};
pub use matches::{
    AlliancePatch, Color, CompLevel, Match, MatchAlliance, MatchKey, MatchKeyParseError,
    MatchPatch, Roster, Score, SeriesKey,
};
pub use rankings::{Ranking, RankingData, RawRankingTable, WinLossRecord};
pub use snapshot::{FeedSnapshot, PlayoffFormat};
pub use status::{
    AllianceRole, AllianceStatus, Phase, PlayoffState, PlayoffStatus, QualStanding, QualStatus,
    TeamEventStatus,
};
