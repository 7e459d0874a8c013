//! Match records, their identity, and the feed's partial-update shape.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

use super::keys::{EventKey, TeamKey};

/// A match roster. Alliances hold at most four teams in every supported season.
pub type Roster = SmallVec<[TeamKey; 4]>;

/// Stage of the bracket a match belongs to.
///
/// Variant order is bracket order, so the derived `Ord` ranks `Final` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompLevel {
    #[serde(rename = "qm")]
    Qual,
    #[serde(rename = "ef")]
    Eighth,
    #[serde(rename = "qf")]
    Quarter,
    #[serde(rename = "sf")]
    Semi,
    #[serde(rename = "f")]
    Final,
}

impl CompLevel {
    /// Elimination levels from the top of the bracket down.
    pub const ELIMINATION_DESC: [CompLevel; 4] = [
        CompLevel::Final,
        CompLevel::Semi,
        CompLevel::Quarter,
        CompLevel::Eighth,
    ];

    pub fn is_elimination(self) -> bool {
        self != CompLevel::Qual
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            CompLevel::Qual => "qm",
            CompLevel::Eighth => "ef",
            CompLevel::Quarter => "qf",
            CompLevel::Semi => "sf",
            CompLevel::Final => "f",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CompLevel::Qual => "Quals",
            CompLevel::Eighth => "Octofinals",
            CompLevel::Quarter => "Quarterfinals",
            CompLevel::Semi => "Semifinals",
            CompLevel::Final => "Finals",
        }
    }

    pub fn order(self) -> u64 {
        match self {
            CompLevel::Qual => 1,
            CompLevel::Eighth => 2,
            CompLevel::Quarter => 3,
            CompLevel::Semi => 4,
            CompLevel::Final => 5,
        }
    }

    /// The level a series winner advances to.
    pub fn next(self) -> Option<CompLevel> {
        match self {
            CompLevel::Qual | CompLevel::Final => None,
            CompLevel::Eighth => Some(CompLevel::Quarter),
            CompLevel::Quarter => Some(CompLevel::Semi),
            CompLevel::Semi => Some(CompLevel::Final),
        }
    }

    fn from_abbrev(abbrev: &str) -> Option<CompLevel> {
        match abbrev {
            "qm" => Some(CompLevel::Qual),
            "ef" => Some(CompLevel::Eighth),
            "qf" => Some(CompLevel::Quarter),
            "sf" => Some(CompLevel::Semi),
            "f" => Some(CompLevel::Final),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbrev())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    pub fn opposite(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Blue => write!(f, "blue"),
        }
    }
}

/// An alliance's score.
///
/// On the wire this is a plain integer; the feed marks unplayed matches with
/// `-1`, and any negative value is read as unplayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Score {
    #[default]
    Unplayed,
    Points(u32),
}

impl Score {
    pub fn points(self) -> Option<u32> {
        match self {
            Score::Unplayed => None,
            Score::Points(p) => Some(p),
        }
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        u32::try_from(value).map_or(Score::Unplayed, Score::Points)
    }
}

impl From<Score> for i64 {
    fn from(value: Score) -> Self {
        match value {
            Score::Unplayed => -1,
            Score::Points(p) => i64::from(p),
        }
    }
}

/// Identifies one best-of-three series within an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    pub comp_level: CompLevel,
    pub set_number: u16,
}

impl SeriesKey {
    pub fn new(comp_level: CompLevel, set_number: u16) -> Self {
        Self {
            comp_level,
            set_number,
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.comp_level, self.set_number)
    }
}

/// The canonical identity of a match.
///
/// Renders as `2019casj_qm12` for qualification matches and
/// `2019casj_sf2m3` for elimination matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchKey {
    pub event: EventKey,
    pub comp_level: CompLevel,
    pub set_number: u16,
    pub match_number: u16,
}

impl MatchKey {
    pub fn new(event: EventKey, comp_level: CompLevel, set_number: u16, match_number: u16) -> Self {
        Self {
            event,
            comp_level,
            set_number,
            match_number,
        }
    }

    /// Sort key matching the order matches are played in: level first, then
    /// match number, then set, so `qf1m1, qf2m1, ..., qf1m2` interleave.
    pub fn play_order(&self) -> (u64, u16, u16) {
        (self.comp_level.order(), self.match_number, self.set_number)
    }

    /// The series this match belongs to. Qualification matches have none.
    pub fn series(&self) -> Option<SeriesKey> {
        self.comp_level
            .is_elimination()
            .then(|| SeriesKey::new(self.comp_level, self.set_number))
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.comp_level {
            CompLevel::Qual => write!(f, "{}_qm{}", self.event, self.match_number),
            level => write!(
                f,
                "{}_{}{}m{}",
                self.event, level, self.set_number, self.match_number
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchKeyParseError {
    #[error("match key {0:?} has no event separator")]
    MissingSeparator(String),
    #[error("match key {0:?} has an unknown comp level")]
    UnknownLevel(String),
    #[error("match key {0:?} has a malformed set or match number")]
    BadNumber(String),
}

impl FromStr for MatchKey {
    type Err = MatchKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (event, rest) = s
            .rsplit_once('_')
            .ok_or_else(|| MatchKeyParseError::MissingSeparator(s.to_owned()))?;
        let split = rest
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| MatchKeyParseError::BadNumber(s.to_owned()))?;
        let (abbrev, numbers) = rest.split_at(split);
        let comp_level = CompLevel::from_abbrev(abbrev)
            .ok_or_else(|| MatchKeyParseError::UnknownLevel(s.to_owned()))?;
        let bad_number = || MatchKeyParseError::BadNumber(s.to_owned());

        let (set_number, match_number) = match comp_level {
            CompLevel::Qual => (1, numbers.parse().map_err(|_| bad_number())?),
            _ => {
                let (set, number) = numbers.split_once('m').ok_or_else(bad_number)?;
                (
                    set.parse().map_err(|_| bad_number())?,
                    number.parse().map_err(|_| bad_number())?,
                )
            }
        };

        Ok(MatchKey::new(
            EventKey::new(event),
            comp_level,
            set_number,
            match_number,
        ))
    }
}

impl TryFrom<String> for MatchKey {
    type Error = MatchKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchKey> for String {
    fn from(value: MatchKey) -> Self {
        value.to_string()
    }
}

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchAlliance {
    #[serde(default)]
    pub teams: Roster,
    #[serde(default)]
    pub surrogates: SmallVec<[TeamKey; 2]>,
    #[serde(default)]
    pub dqs: SmallVec<[TeamKey; 2]>,
    #[serde(default)]
    pub score: Score,
}

impl MatchAlliance {
    pub fn contains(&self, team: &TeamKey) -> bool {
        self.teams.contains(team)
    }
}

/// A canonical match record.
///
/// Derived views (`has_been_played`, `winning_alliance`) are computed from the
/// current fields on every call; nothing about a result is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub key: MatchKey,
    pub red: MatchAlliance,
    pub blue: MatchAlliance,
    #[serde(default)]
    pub score_breakdown: Option<serde_json::Value>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub actual_time: Option<OffsetDateTime>,
}

impl Match {
    /// An empty, unplayed match slot.
    pub fn placeholder(key: MatchKey) -> Self {
        Self {
            key,
            red: MatchAlliance::default(),
            blue: MatchAlliance::default(),
            score_breakdown: None,
            scheduled_time: None,
            actual_time: None,
        }
    }

    pub fn alliance(&self, color: Color) -> &MatchAlliance {
        match color {
            Color::Red => &self.red,
            Color::Blue => &self.blue,
        }
    }

    pub fn alliance_mut(&mut self, color: Color) -> &mut MatchAlliance {
        match color {
            Color::Red => &mut self.red,
            Color::Blue => &mut self.blue,
        }
    }

    /// Both alliances carry a real score.
    pub fn has_been_played(&self) -> bool {
        self.red.score.points().is_some() && self.blue.score.points().is_some()
    }

    /// The color with the strictly higher score, if the match has been played.
    pub fn winning_alliance(&self) -> Option<Color> {
        let (red, blue) = (self.red.score.points()?, self.blue.score.points()?);
        match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Some(Color::Red),
            std::cmp::Ordering::Less => Some(Color::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Played with equal finite scores.
    pub fn is_tie(&self) -> bool {
        self.has_been_played() && self.winning_alliance().is_none()
    }

    /// The color this team plays for in this match.
    pub fn color_of(&self, team: &TeamKey) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|color| self.alliance(*color).contains(team))
    }

    /// Whether the team appears on either roster, including as a surrogate.
    pub fn involves(&self, team: &TeamKey) -> bool {
        self.color_of(team).is_some()
            || self.red.surrogates.contains(team)
            || self.blue.surrogates.contains(team)
    }
}

/// Partial update for one alliance. Absent fields leave the stored value alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlliancePatch {
    #[serde(default)]
    pub teams: Option<Roster>,
    #[serde(default)]
    pub surrogates: Option<SmallVec<[TeamKey; 2]>>,
    #[serde(default)]
    pub dqs: Option<SmallVec<[TeamKey; 2]>>,
    #[serde(default)]
    pub score: Option<Score>,
}

impl AlliancePatch {
    pub fn roster(teams: impl IntoIterator<Item = TeamKey>) -> Self {
        Self {
            teams: Some(teams.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn scored(teams: impl IntoIterator<Item = TeamKey>, score: u32) -> Self {
        Self {
            teams: Some(teams.into_iter().collect()),
            score: Some(Score::Points(score)),
            ..Self::default()
        }
    }
}

/// A match as reported by the feed.
///
/// `key` is the feed's own identifier string. It is carried alongside the
/// explicit level, set, and match numbers so that a snapshot contradicting
/// itself about a match's identity can be detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPatch {
    pub key: String,
    pub comp_level: CompLevel,
    #[serde(default = "default_set_number")]
    pub set_number: u16,
    pub match_number: u16,
    #[serde(default)]
    pub red: Option<AlliancePatch>,
    #[serde(default)]
    pub blue: Option<AlliancePatch>,
    #[serde(default)]
    pub score_breakdown: Option<serde_json::Value>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub actual_time: Option<OffsetDateTime>,
}

fn default_set_number() -> u16 {
    1
}

impl MatchPatch {
    /// A patch whose feed key is the canonical rendering of `key`.
    pub fn for_key(key: &MatchKey) -> Self {
        Self {
            key: key.to_string(),
            comp_level: key.comp_level,
            set_number: key.set_number,
            match_number: key.match_number,
            red: None,
            blue: None,
            score_breakdown: None,
            scheduled_time: None,
            actual_time: None,
        }
    }

    pub fn with_alliance(mut self, color: Color, patch: AlliancePatch) -> Self {
        match color {
            Color::Red => self.red = Some(patch),
            Color::Blue => self.blue = Some(patch),
        }
        self
    }

    pub fn alliance(&self, color: Color) -> Option<&AlliancePatch> {
        match color {
            Color::Red => self.red.as_ref(),
            Color::Blue => self.blue.as_ref(),
        }
    }

    /// The canonical key implied by the explicit fields.
    pub fn match_key(&self, event: &EventKey) -> MatchKey {
        MatchKey::new(
            event.clone(),
            self.comp_level,
            self.set_number,
            self.match_number,
        )
    }
}
