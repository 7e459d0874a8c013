//! Alliance selection results.

use serde::{Deserialize, Serialize};

use super::keys::TeamKey;

/// A mid-event substitution: `out` stops playing and `replacement` takes the slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupSwap {
    pub out: TeamKey,
    #[serde(rename = "in")]
    pub replacement: TeamKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    #[serde(default)]
    pub name: Option<String>,
    pub captain: TeamKey,
    #[serde(default)]
    pub picks: Vec<TeamKey>,
    #[serde(default)]
    pub backup: Option<BackupSwap>,
}

impl Alliance {
    pub fn new(captain: TeamKey, picks: Vec<TeamKey>) -> Self {
        Self {
            name: None,
            captain,
            picks,
            backup: None,
        }
    }

    /// The alliance's name, defaulting to `Alliance {number}` (1-based).
    pub fn display_name(&self, number: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Alliance {number}"))
    }

    /// Captain followed by picks, in draft order.
    pub fn drafted(&self) -> impl Iterator<Item = &TeamKey> {
        std::iter::once(&self.captain).chain(self.picks.iter())
    }

    /// Teams currently eligible to play for this alliance: the draft with
    /// any backup swap applied.
    pub fn playing_teams(&self) -> Vec<TeamKey> {
        let out = self.backup.as_ref().map(|b| &b.out);
        let mut teams: Vec<TeamKey> = self
            .drafted()
            .filter(|team| Some(*team) != out)
            .cloned()
            .collect();
        if let Some(backup) = &self.backup {
            teams.push(backup.replacement.clone());
        }
        teams
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllianceSelection {
    pub alliances: Vec<Alliance>,
}

impl AllianceSelection {
    pub fn new(alliances: Vec<Alliance>) -> Self {
        Self { alliances }
    }
}
