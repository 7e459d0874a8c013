//! Canonical per-event state.

use crate::bracket::{Bracket, SeededSlot};
use crate::events::Publication;
use crate::status;
use fieldsync_sdk::objects::{
    AllianceSelection, EventKey, Match, MatchKey, PlayoffFormat, RankingData, TeamEventStatus,
    TeamKey,
};
use std::collections::{BTreeMap, BTreeSet};

/// Everything reconciled so far for one event.
///
/// The only mutation is [`apply`](EventState::apply), which takes a whole
/// publication at once.
#[derive(Debug, Clone, PartialEq)]
pub struct EventState {
    pub event: EventKey,
    pub year: u16,
    pub playoff_format: PlayoffFormat,
    pub teams: Vec<TeamKey>,
    pub matches: BTreeMap<MatchKey, Match>,
    pub rankings: RankingData,
    pub alliances: Option<AllianceSelection>,
    /// Roster slots filled by advancement rather than by the feed.
    pub seeded: BTreeSet<SeededSlot>,
}

impl EventState {
    pub fn new(event: EventKey, year: u16, playoff_format: PlayoffFormat) -> Self {
        Self {
            event,
            year,
            playoff_format,
            teams: Vec::new(),
            matches: BTreeMap::new(),
            rankings: RankingData::NotPublished,
            alliances: None,
            seeded: BTreeSet::new(),
        }
    }

    pub fn apply(&mut self, publication: &Publication) {
        self.year = publication.year;
        self.playoff_format = publication.playoff_format;
        for key in &publication.to_delete {
            self.matches.remove(key);
        }
        for m in &publication.to_upsert {
            self.matches.insert(m.key.clone(), m.clone());
        }
        if let Some(rankings) = &publication.rankings {
            self.rankings = rankings.clone();
        }
        if let Some(alliances) = &publication.alliances {
            self.alliances = Some(alliances.clone());
        }
        if let Some(teams) = &publication.teams {
            self.teams = teams.clone();
        }
        if let Some(seeded) = &publication.seeded {
            self.seeded = seeded.clone();
        }
    }

    /// Matches sorted the way they are played.
    pub fn matches_in_play_order(&self) -> Vec<&Match> {
        let mut matches: Vec<&Match> = self.matches.values().collect();
        matches.sort_by_key(|m| m.key.play_order());
        matches
    }

    pub fn bracket(&self) -> Bracket {
        Bracket::from_matches(self.event.clone(), self.playoff_format, self.matches.values())
    }

    pub fn status(&self, team: &TeamKey) -> TeamEventStatus {
        status::generate_status(team, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_sdk::objects::{CompLevel, Ranking};

    #[test]
    fn test_apply_replaces_whole_batch() {
        let event = EventKey::new("2019casj");
        let mut state = EventState::new(event.clone(), 2019, PlayoffFormat::Bracket8Team);
        let stale = MatchKey::new(event.clone(), CompLevel::Quarter, 1, 3);
        state
            .matches
            .insert(stale.clone(), Match::placeholder(stale.clone()));
        state.rankings = RankingData::Unsupported;

        let fresh = MatchKey::new(event.clone(), CompLevel::Quarter, 1, 1);
        let mut publication = Publication::empty(event, 2019, PlayoffFormat::Bracket8Team);
        publication.to_upsert.push(Match::placeholder(fresh.clone()));
        publication.to_delete.push(stale.clone());
        publication.rankings = Some(RankingData::Published(vec![Ranking {
            rank: 1,
            team: TeamKey::new("254"),
            record: None,
            qual_average: None,
            matches_played: 0,
            dq: 0,
            sort_orders: Vec::new(),
        }]));

        state.apply(&publication);
        assert!(state.matches.contains_key(&fresh));
        assert!(!state.matches.contains_key(&stale));
        assert_eq!(state.rankings.rankings().len(), 1);
        assert_eq!(state.alliances, None);
    }

    #[test]
    fn test_unchanged_fields_survive_apply() {
        let event = EventKey::new("2019casj");
        let mut state = EventState::new(event.clone(), 2019, PlayoffFormat::Bracket8Team);
        state.teams = vec![TeamKey::new("254")];
        state.rankings = RankingData::Unsupported;

        state.apply(&Publication::empty(event, 2019, PlayoffFormat::Bracket8Team));
        assert_eq!(state.teams, vec![TeamKey::new("254")]);
        assert_eq!(state.rankings, RankingData::Unsupported);
    }
}
