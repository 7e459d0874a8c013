//! EventStatusComposer.
//!
//! Derives one team's [`TeamEventStatus`] from an event's canonical state.
//! Nothing here is cached: every call reads the current matches, rankings,
//! and alliance selection.

use crate::bracket::Bracket;
use crate::state::EventState;
use fieldsync_sdk::objects::{
    Alliance, AllianceRole, AllianceStatus, Color, CompLevel, Match, Phase, PlayoffState,
    PlayoffStatus, QualStanding, QualStatus, RankingData, TeamEventStatus, TeamKey,
    WinLossRecord,
};

/// Teams a color roster must share with an alliance for the match to count
/// as that alliance's.
const ROSTER_OVERLAP: usize = 2;

pub fn generate_status(team: &TeamKey, state: &EventState) -> TeamEventStatus {
    let registered = state.teams.contains(team);
    let mut status = TeamEventStatus::minimal(team.clone(), registered);

    let played_in: Vec<&Match> = state
        .matches_in_play_order()
        .into_iter()
        .filter(|m| m.involves(team))
        .collect();
    status.last_match = played_in
        .iter()
        .rev()
        .find(|m| m.has_been_played())
        .map(|m| m.key.clone());
    status.next_match = played_in
        .iter()
        .find(|m| !m.has_been_played())
        .map(|m| m.key.clone());

    status.qual = qual_status(team, state, &played_in);

    let found = find_alliance(team, state);
    status.alliance = found.as_ref().map(|(number, alliance, role)| AllianceStatus {
        number: *number,
        name: alliance.display_name(usize::from(*number)),
        role: *role,
    });

    status.playoff = match &found {
        Some((_, _, AllianceRole::BackupOut)) => None,
        Some((_, alliance, _)) => Some(
            playoff_status(&alliance.playing_teams(), state).unwrap_or_else(PlayoffStatus::not_started),
        ),
        None => derived_roster(team, &played_in)
            .and_then(|roster| playoff_status(&roster, state)),
    };

    status
}

fn qual_status(team: &TeamKey, state: &EventState, played_in: &[&Match]) -> Option<QualStatus> {
    let in_quals = played_in
        .iter()
        .any(|m| m.key.comp_level == CompLevel::Qual);

    let (standing, num_teams) = match &state.rankings {
        RankingData::Published(rankings) => {
            let num_teams = u32::try_from(rankings.len()).ok();
            match rankings.iter().find(|r| &r.team == team) {
                Some(ranking) => (QualStanding::Ranked(ranking.clone()), num_teams),
                None if in_quals => (QualStanding::Pending, num_teams),
                None => return None,
            }
        }
        RankingData::Unsupported if in_quals => (QualStanding::Unsupported, None),
        RankingData::NotPublished if in_quals => (QualStanding::Pending, None),
        _ => return None,
    };

    Some(QualStatus {
        phase: qual_phase(state),
        num_teams,
        standing,
    })
}

fn qual_phase(state: &EventState) -> Phase {
    let mut quals = state
        .matches
        .values()
        .filter(|m| m.key.comp_level == CompLevel::Qual)
        .peekable();
    let all_quals_played = quals.peek().is_some() && quals.all(|m| m.has_been_played());
    let playoffs_begun = state.matches.keys().any(|k| k.comp_level.is_elimination());
    let selection_published = state
        .alliances
        .as_ref()
        .is_some_and(|s| !s.alliances.is_empty());

    if all_quals_played || playoffs_begun || selection_published {
        Phase::Completed
    } else {
        Phase::Playing
    }
}

/// The team's alliance, its 1-based number, and the team's role on it.
fn find_alliance<'a>(
    team: &TeamKey,
    state: &'a EventState,
) -> Option<(u16, &'a Alliance, AllianceRole)> {
    let selection = state.alliances.as_ref()?;
    selection
        .alliances
        .iter()
        .enumerate()
        .find_map(|(index, alliance)| {
            let role = alliance_role(team, alliance)?;
            let number = u16::try_from(index + 1).ok()?;
            Some((number, alliance, role))
        })
}

fn alliance_role(team: &TeamKey, alliance: &Alliance) -> Option<AllianceRole> {
    if let Some(backup) = &alliance.backup {
        if &backup.replacement == team {
            return Some(AllianceRole::BackupIn);
        }
        if &backup.out == team {
            return Some(AllianceRole::BackupOut);
        }
    }
    if &alliance.captain == team {
        return Some(AllianceRole::Captain);
    }
    alliance
        .picks
        .iter()
        .position(|p| p == team)
        .and_then(|index| u8::try_from(index + 1).ok())
        .map(AllianceRole::Pick)
}

/// Without an alliance selection, the team plays with whoever shares its
/// color in its first elimination match.
fn derived_roster(team: &TeamKey, played_in: &[&Match]) -> Option<Vec<TeamKey>> {
    played_in
        .iter()
        .filter(|m| m.key.comp_level.is_elimination())
        .find_map(|m| m.color_of(team).map(|c| m.alliance(c).teams.to_vec()))
}

/// The color `roster` plays in `m`, if enough of it is on one side.
fn alliance_color(m: &Match, roster: &[TeamKey]) -> Option<Color> {
    let needed = ROSTER_OVERLAP.min(roster.len()).max(1);
    Color::ALL.into_iter().find(|color| {
        m.alliance(*color)
            .teams
            .iter()
            .filter(|t| roster.contains(t))
            .count()
            >= needed
    })
}

fn playoff_status(roster: &[TeamKey], state: &EventState) -> Option<PlayoffStatus> {
    let matches: Vec<(&Match, Color)> = state
        .matches_in_play_order()
        .into_iter()
        .filter(|m| m.key.comp_level.is_elimination())
        .filter_map(|m| alliance_color(m, roster).map(|c| (m, c)))
        .collect();
    if matches.is_empty() {
        return None;
    }
    if !matches.iter().any(|(m, _)| m.has_been_played()) {
        return Some(PlayoffStatus::not_started());
    }

    let level = matches
        .iter()
        .map(|(m, _)| m.key.comp_level)
        .max()
        .unwrap_or(CompLevel::Final);

    let mut record = WinLossRecord::default();
    let mut current_level_record = WinLossRecord::default();
    let mut scores = Vec::new();
    for (m, color) in &matches {
        if !m.has_been_played() {
            continue;
        }
        let result = match m.winning_alliance() {
            Some(winner) if winner == *color => WinLossRecord::new(1, 0, 0),
            Some(_) => WinLossRecord::new(0, 1, 0),
            None => WinLossRecord::new(0, 0, 1),
        };
        record += result;
        if m.key.comp_level == level {
            current_level_record += result;
        }
        if let Some(points) = m.alliance(*color).score.points() {
            scores.push(f64::from(points));
        }
    }
    let playoff_average =
        (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

    let status = outcome(&state.bracket(), &matches, level);

    Some(PlayoffStatus {
        status,
        level: Some(level),
        current_level_record: Some(current_level_record),
        record: Some(record),
        playoff_average,
    })
}

/// The alliance's standing given the latest series it appears in at `level`.
fn outcome(bracket: &Bracket, matches: &[(&Match, Color)], level: CompLevel) -> PlayoffState {
    let Some((latest, color)) = matches
        .iter()
        .rev()
        .find(|(m, _)| m.key.comp_level == level)
    else {
        return PlayoffState::NotStarted;
    };
    let winner = bracket
        .series(level, latest.key.set_number)
        .and_then(|s| s.winner());

    match winner {
        Some(winner) if winner == *color && level == CompLevel::Final => PlayoffState::Won,
        Some(winner) if winner == *color => PlayoffState::Playing,
        Some(_) => PlayoffState::Eliminated,
        None => PlayoffState::Playing,
    }
}
