//! Plain-text status sentences.
//!
//! [`describe`] reads only the [`TeamEventStatus`] it is given, so rendering
//! the same status twice always yields the same text.

use fieldsync_sdk::objects::{
    AllianceRole, AllianceStatus, Phase, PlayoffState, PlayoffStatus, QualStanding, QualStatus,
    TeamEventStatus,
};

pub fn describe(status: &TeamEventStatus) -> String {
    let team = status.team.number();

    if let Some(playoff) = status
        .playoff
        .as_ref()
        .filter(|p| p.status == PlayoffState::Playing)
    {
        return format!("Team {team} {}.", playing_component(playoff, status.alliance.as_ref()));
    }

    let mut components = Vec::new();
    if let Some(qual) = &status.qual {
        components.push(qual_component(qual));
    }
    match (&status.alliance, &status.playoff) {
        (Some(alliance), _) if alliance.role == AllianceRole::BackupOut => {
            components.push(format!("was replaced by a backup on {}", alliance.name));
        }
        (Some(alliance), Some(playoff)) if playoff.is_finalized() => {
            components.push(format!(
                "competed in the playoffs as the {} of {}",
                role_name(alliance.role),
                alliance.name
            ));
            components.push(finished_component(playoff));
        }
        (Some(alliance), _) => components.push(format!(
            "will be competing in the playoffs as the {} of {}",
            role_name(alliance.role),
            alliance.name
        )),
        (None, Some(playoff)) if playoff.is_finalized() => {
            components.push(finished_component(playoff));
        }
        (None, _) => {}
    }

    if components.is_empty() {
        return if status.registered {
            format!("Team {team} is waiting for the event to begin.")
        } else {
            format!("Team {team} has no recorded participation at this event.")
        };
    }

    if components.len() > 1 {
        if let Some(last) = components.last_mut() {
            *last = format!("and {last}");
        }
    }
    let separator = if components.len() > 2 { ", " } else { " " };
    format!("Team {team} {}.", components.join(separator))
}

fn qual_component(qual: &QualStatus) -> String {
    let verb = match qual.phase {
        Phase::Playing => "is",
        Phase::Completed => "was",
    };
    match &qual.standing {
        QualStanding::Pending => {
            "is waiting for qualification rankings to be published".to_owned()
        }
        QualStanding::Unsupported => {
            "does not have qualification rankings available for this season".to_owned()
        }
        QualStanding::Ranked(ranking) => {
            let rank = match qual.num_teams {
                Some(n) => format!("Rank {}/{n}", ranking.rank),
                None => format!("Rank {}", ranking.rank),
            };
            match (&ranking.record, ranking.qual_average) {
                (Some(record), _) => format!("{verb} {rank} with a record of {record} in quals"),
                (None, Some(average)) => {
                    format!("{verb} {rank} with an average score of {average:.1} in quals")
                }
                (None, None) => format!("{verb} {rank} in quals"),
            }
        }
    }
}

fn playing_component(playoff: &PlayoffStatus, alliance: Option<&AllianceStatus>) -> String {
    let level = playoff
        .level
        .map_or("Playoffs", |level| level.display_name());
    let record = playoff.current_level_record.unwrap_or_default();
    match alliance {
        Some(alliance) => format!(
            "is {record} in the {level} as the {} of {}",
            role_name(alliance.role),
            alliance.name
        ),
        None => format!("is {record} in the {level}"),
    }
}

fn finished_component(playoff: &PlayoffStatus) -> String {
    let result = match (playoff.status, playoff.level) {
        (PlayoffState::Won, _) => "won the event".to_owned(),
        (_, Some(level)) => format!("was eliminated in the {}", level.display_name()),
        (_, None) => "was eliminated in the playoffs".to_owned(),
    };
    match playoff.record {
        Some(record) => format!("{result} with a playoff record of {record}"),
        None => result,
    }
}

fn role_name(role: AllianceRole) -> String {
    match role {
        AllianceRole::Captain => "Captain".to_owned(),
        AllianceRole::Pick(n) => format!("{} Pick", ordinal(n)),
        AllianceRole::BackupIn | AllianceRole::BackupOut => "Backup".to_owned(),
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_sdk::objects::{CompLevel, Ranking, TeamKey, WinLossRecord};

    fn ranked(record: Option<WinLossRecord>, average: Option<f64>, phase: Phase) -> QualStatus {
        QualStatus {
            phase,
            num_teams: Some(40),
            standing: QualStanding::Ranked(Ranking {
                rank: 3,
                team: TeamKey::new("254"),
                record,
                qual_average: average,
                matches_played: 10,
                dq: 0,
                sort_orders: vec![],
            }),
        }
    }

    fn base() -> TeamEventStatus {
        TeamEventStatus::minimal(TeamKey::new("254"), true)
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
    }

    #[test]
    fn test_quals_in_progress() {
        let mut status = base();
        status.qual = Some(ranked(Some(WinLossRecord::new(7, 2, 1)), None, Phase::Playing));
        assert_eq!(
            describe(&status),
            "Team 254 is Rank 3/40 with a record of 7-2-1 in quals."
        );
    }

    #[test]
    fn test_average_season_phrasing() {
        let mut status = base();
        status.qual = Some(ranked(None, Some(121.27), Phase::Completed));
        assert_eq!(
            describe(&status),
            "Team 254 was Rank 3/40 with an average score of 121.3 in quals."
        );
    }

    #[test]
    fn test_selected_before_playoffs() {
        let mut status = base();
        status.qual = Some(ranked(Some(WinLossRecord::new(7, 2, 1)), None, Phase::Completed));
        status.alliance = Some(AllianceStatus {
            number: 2,
            name: "Alliance 2".to_owned(),
            role: AllianceRole::Pick(1),
        });
        status.playoff = Some(PlayoffStatus::not_started());
        assert_eq!(
            describe(&status),
            "Team 254 was Rank 3/40 with a record of 7-2-1 in quals and will be competing in the playoffs as the 1st Pick of Alliance 2."
        );
    }

    #[test]
    fn test_playing_replaces_other_components() {
        let mut status = base();
        status.qual = Some(ranked(Some(WinLossRecord::new(7, 2, 1)), None, Phase::Completed));
        status.alliance = Some(AllianceStatus {
            number: 1,
            name: "Alliance 1".to_owned(),
            role: AllianceRole::Captain,
        });
        status.playoff = Some(PlayoffStatus {
            status: PlayoffState::Playing,
            level: Some(CompLevel::Semi),
            current_level_record: Some(WinLossRecord::new(1, 0, 0)),
            record: Some(WinLossRecord::new(3, 0, 0)),
            playoff_average: Some(150.0),
        });
        assert_eq!(
            describe(&status),
            "Team 254 is 1-0-0 in the Semifinals as the Captain of Alliance 1."
        );
    }

    #[test]
    fn test_three_components_use_commas() {
        let mut status = base();
        status.qual = Some(ranked(Some(WinLossRecord::new(7, 2, 1)), None, Phase::Completed));
        status.alliance = Some(AllianceStatus {
            number: 4,
            name: "Alliance 4".to_owned(),
            role: AllianceRole::Captain,
        });
        status.playoff = Some(PlayoffStatus {
            status: PlayoffState::Eliminated,
            level: Some(CompLevel::Quarter),
            current_level_record: Some(WinLossRecord::new(1, 2, 0)),
            record: Some(WinLossRecord::new(1, 2, 0)),
            playoff_average: Some(90.0),
        });
        assert_eq!(
            describe(&status),
            "Team 254 was Rank 3/40 with a record of 7-2-1 in quals, competed in the playoffs as the Captain of Alliance 4, and was eliminated in the Quarterfinals with a playoff record of 1-2-0."
        );
    }

    #[test]
    fn test_pending_and_unsupported_differ() {
        let mut pending = base();
        pending.qual = Some(QualStatus {
            phase: Phase::Playing,
            num_teams: None,
            standing: QualStanding::Pending,
        });
        let mut unsupported = pending.clone();
        if let Some(qual) = unsupported.qual.as_mut() {
            qual.standing = QualStanding::Unsupported;
        }
        assert_ne!(describe(&pending), describe(&unsupported));
        assert!(describe(&unsupported).contains("not"));
    }

    #[test]
    fn test_no_participation() {
        assert_eq!(
            describe(&base()),
            "Team 254 is waiting for the event to begin."
        );
        let stranger = TeamEventStatus::minimal(TeamKey::new("9999"), false);
        assert_eq!(
            describe(&stranger),
            "Team 9999 has no recorded participation at this event."
        );
    }

    #[test]
    fn test_describe_is_stable() {
        let mut status = base();
        status.qual = Some(ranked(None, Some(88.0), Phase::Playing));
        assert_eq!(describe(&status), describe(&status.clone()));
    }
}
