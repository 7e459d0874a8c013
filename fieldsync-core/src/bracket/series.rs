use fieldsync_sdk::objects::{Color, Match, Roster, SeriesKey};

/// Best-of-three: the first alliance to this many wins takes the series.
pub const WINS_TO_DECIDE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesState {
    Open,
    /// Decided in favor of the color, by the given match number.
    Decided { winner: Color, at_match: u16 },
}

/// The matches of one elimination series, tallied in match-number order.
///
/// Wins are counted per color: an alliance keeps its color for every match of
/// a series. Ties count for neither side.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    key: SeriesKey,
    matches: Vec<Match>,
    red_wins: u8,
    blue_wins: u8,
    ties: u8,
    state: SeriesState,
}

impl Series {
    pub fn new(key: SeriesKey, mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| m.key.match_number);

        let mut series = Self {
            key,
            matches,
            red_wins: 0,
            blue_wins: 0,
            ties: 0,
            state: SeriesState::Open,
        };
        for index in 0..series.matches.len() {
            let m = &series.matches[index];
            let number = m.key.match_number;
            match (m.winning_alliance(), m.is_tie()) {
                (Some(Color::Red), _) => series.red_wins += 1,
                (Some(Color::Blue), _) => series.blue_wins += 1,
                (None, true) => series.ties = series.ties.saturating_add(1),
                (None, false) => {}
            }
            if let Some(winner) = series.leader() {
                series.state = SeriesState::Decided {
                    winner,
                    at_match: number,
                };
                break;
            }
        }
        series
    }

    fn leader(&self) -> Option<Color> {
        if self.red_wins >= WINS_TO_DECIDE {
            Some(Color::Red)
        } else if self.blue_wins >= WINS_TO_DECIDE {
            Some(Color::Blue)
        } else {
            None
        }
    }

    pub fn key(&self) -> SeriesKey {
        self.key
    }

    pub fn state(&self) -> SeriesState {
        self.state
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.state, SeriesState::Decided { .. })
    }

    pub fn winner(&self) -> Option<Color> {
        match self.state {
            SeriesState::Decided { winner, .. } => Some(winner),
            SeriesState::Open => None,
        }
    }

    /// The winning roster as fielded in the deciding match.
    pub fn winner_roster(&self) -> Option<&Roster> {
        let SeriesState::Decided { winner, at_match } = self.state else {
            return None;
        };
        self.matches
            .iter()
            .find(|m| m.key.match_number == at_match)
            .map(|m| &m.alliance(winner).teams)
    }

    pub fn wins(&self, color: Color) -> u8 {
        match color {
            Color::Red => self.red_wins,
            Color::Blue => self.blue_wins,
        }
    }

    pub fn ties(&self) -> u8 {
        self.ties
    }

    /// Whether a match number falls after the deciding match.
    pub fn is_superfluous(&self, match_number: u16) -> bool {
        match self.state {
            SeriesState::Decided { at_match, .. } => match_number > at_match,
            SeriesState::Open => false,
        }
    }

    /// Matches in match-number order.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_sdk::objects::{CompLevel, EventKey, MatchKey, Score, TeamKey};

    fn played(number: u16, red: u32, blue: u32) -> Match {
        let key = MatchKey::new(EventKey::new("2019casj"), CompLevel::Quarter, 1, number);
        let mut m = Match::placeholder(key);
        m.red.teams = ["254", "1678", "973"].into_iter().map(TeamKey::new).collect();
        m.blue.teams = ["604", "115", "5499"].into_iter().map(TeamKey::new).collect();
        m.red.score = Score::Points(red);
        m.blue.score = Score::Points(blue);
        m
    }

    fn qf1() -> SeriesKey {
        SeriesKey::new(CompLevel::Quarter, 1)
    }

    #[test]
    fn test_sweep_decides_at_second_match() {
        let s = Series::new(qf1(), vec![played(2, 180, 90), played(1, 200, 100)]);
        assert_eq!(
            s.state(),
            SeriesState::Decided {
                winner: Color::Red,
                at_match: 2
            }
        );
        assert!(s.is_superfluous(3));
        assert!(!s.is_superfluous(2));
        assert_eq!(s.winner_roster().unwrap()[0], TeamKey::new("254"));
    }

    #[test]
    fn test_split_series_stays_open() {
        let s = Series::new(qf1(), vec![played(1, 50, 60), played(2, 70, 60)]);
        assert_eq!(s.state(), SeriesState::Open);
        assert_eq!((s.wins(Color::Red), s.wins(Color::Blue)), (1, 1));
        assert_eq!(s.winner_roster(), None);
    }

    #[test]
    fn test_tie_counts_for_neither() {
        let s = Series::new(
            qf1(),
            vec![played(1, 80, 60), played(2, 70, 70), played(3, 90, 10)],
        );
        assert_eq!(s.ties(), 1);
        assert_eq!(
            s.state(),
            SeriesState::Decided {
                winner: Color::Red,
                at_match: 3
            }
        );
    }

    #[test]
    fn test_tie_count_saturates() {
        let ties: Vec<Match> = (1..=300).map(|n| played(n, 50, 50)).collect();
        let s = Series::new(qf1(), ties);
        assert_eq!(s.ties(), u8::MAX);
        assert_eq!(s.state(), SeriesState::Open);
    }

    #[test]
    fn test_unplayed_matches_do_not_count() {
        let mut pending = played(2, 0, 0);
        pending.red.score = Score::Unplayed;
        pending.blue.score = Score::Unplayed;
        let s = Series::new(qf1(), vec![played(1, 80, 60), pending]);
        assert_eq!(s.state(), SeriesState::Open);
        assert_eq!(s.ties(), 0);
    }
}
