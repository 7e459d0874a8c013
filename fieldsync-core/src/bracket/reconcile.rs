//! BracketReconciler.
//!
//! Merges the stored matches of one event with the matches a fresh snapshot
//! reports, then classifies every merged match:
//!
//! - matches outside a series the playoff format allows are invalid;
//! - within a series, every match numbered after the deciding match is
//!   invalid, whether or not it was stored by an earlier poll.
//!
//! The result is one batch: valid matches that are new or changed, plus the
//! stored keys that are now invalid. Nothing is written until the whole batch
//! is known.

use super::{Bracket, Series, format};
use fieldsync_sdk::objects::{
    AlliancePatch, Color, EventKey, Match, MatchAlliance, MatchKey, MatchPatch, PlayoffFormat,
};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Contract violations in a snapshot. Odd but plausible feed data never
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("match {key} reports identity {fields} which its key contradicts")]
    ConflictingIdentity { key: String, fields: String },

    #[error("match {key} belongs to event {found}, not {expected}")]
    ForeignEvent {
        key: String,
        expected: EventKey,
        found: EventKey,
    },
}

/// One reconciliation cycle's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Valid merged matches that are new or differ from the stored copy.
    pub to_upsert: Vec<Match>,
    /// Stored matches that are no longer valid.
    pub to_delete: Vec<MatchKey>,
    /// The series view over every valid merged match.
    pub bracket: Bracket,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_upsert.is_empty() && self.to_delete.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BracketReconciler {
    event: EventKey,
    format: PlayoffFormat,
}

impl BracketReconciler {
    pub fn new(event: EventKey, format: PlayoffFormat) -> Self {
        Self { event, format }
    }

    pub fn reconcile(
        &self,
        existing: &BTreeMap<MatchKey, Match>,
        incoming: &[MatchPatch],
    ) -> Result<Reconciliation, ReconcileError> {
        let mut merged = existing.clone();
        for patch in incoming {
            let Some(key) = self.checked_key(patch)? else {
                continue;
            };
            let slot = merged
                .entry(key.clone())
                .or_insert_with(|| Match::placeholder(key));
            merge(slot, patch);
        }

        let invalid = self.classify(&merged);

        let mut to_delete = Vec::new();
        for key in &invalid {
            if existing.contains_key(key) {
                info!(event = %self.event, match_key = %key, "Pruning invalid match");
                to_delete.push(key.clone());
            } else {
                debug!(event = %self.event, match_key = %key, "Dropping invalid reported match");
            }
        }
        merged.retain(|key, _| !invalid.contains(key));

        let to_upsert = merged
            .values()
            .filter(|m| existing.get(&m.key) != Some(m))
            .cloned()
            .collect();
        let bracket = Bracket::from_matches(self.event.clone(), self.format, merged.values());

        Ok(Reconciliation {
            to_upsert,
            to_delete,
            bracket,
        })
    }

    /// The canonical key of a patch, after checking the feed's key string
    /// against the patch's explicit identity fields.
    fn checked_key(&self, patch: &MatchPatch) -> Result<Option<MatchKey>, ReconcileError> {
        let parsed = match patch.key.parse::<MatchKey>() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(event = %self.event, key = %patch.key, error = %e, "Skipping match with unparsable key");
                return Ok(None);
            }
        };
        if parsed.event != self.event {
            error!(event = %self.event, key = %patch.key, "Snapshot contains a match of another event");
            return Err(ReconcileError::ForeignEvent {
                key: patch.key.clone(),
                expected: self.event.clone(),
                found: parsed.event,
            });
        }
        let key = patch.match_key(&self.event);
        if key != parsed {
            error!(event = %self.event, key = %patch.key, fields = %key, "Match key contradicts its fields");
            return Err(ReconcileError::ConflictingIdentity {
                key: patch.key.clone(),
                fields: key.to_string(),
            });
        }
        Ok(Some(key))
    }

    fn classify(&self, merged: &BTreeMap<MatchKey, Match>) -> BTreeSet<MatchKey> {
        let mut invalid = BTreeSet::new();
        let groups: HashMap<_, Vec<Match>> = merged
            .values()
            .filter_map(|m| m.key.series().map(|s| (s, m.clone())))
            .into_group_map();

        for (series_key, matches) in groups {
            if !format::is_valid_series(self.format, series_key) {
                invalid.extend(matches.into_iter().map(|m| m.key));
                continue;
            }
            let (numbered, unnumbered): (Vec<Match>, Vec<Match>) =
                matches.into_iter().partition(|m| m.key.match_number > 0);
            invalid.extend(unnumbered.into_iter().map(|m| m.key));

            let series = Series::new(series_key, numbered);
            invalid.extend(
                series
                    .matches()
                    .iter()
                    .filter(|m| series.is_superfluous(m.key.match_number))
                    .map(|m| m.key.clone()),
            );
        }
        invalid
    }
}

/// Overwrite the fields `patch` carries.
fn merge(target: &mut Match, patch: &MatchPatch) {
    let key = target.key.clone();
    for color in Color::ALL {
        if let Some(alliance_patch) = patch.alliance(color) {
            let played = target.has_been_played();
            merge_alliance(&key, color, played, target.alliance_mut(color), alliance_patch);
        }
    }
    if let Some(breakdown) = &patch.score_breakdown {
        target.score_breakdown = Some(breakdown.clone());
    }
    if let Some(t) = patch.scheduled_time {
        target.scheduled_time = Some(t);
    }
    if let Some(t) = patch.actual_time {
        target.actual_time = Some(t);
    }
}

fn merge_alliance(
    key: &MatchKey,
    color: Color,
    played: bool,
    target: &mut MatchAlliance,
    patch: &AlliancePatch,
) {
    if let Some(teams) = &patch.teams {
        if played && !target.teams.is_empty() && &target.teams != teams {
            warn!(
                match_key = %key,
                %color,
                stored = %target.teams.iter().join(","),
                reported = %teams.iter().join(","),
                "Roster of a played match changed; keeping the latest report"
            );
        }
        target.teams = teams.clone();
    }
    if let Some(surrogates) = &patch.surrogates {
        target.surrogates = surrogates.clone();
    }
    if let Some(dqs) = &patch.dqs {
        target.dqs = dqs.clone();
    }
    if let Some(score) = patch.score {
        target.score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_sdk::objects::{CompLevel, Score, TeamKey};

    const RED: [&str; 3] = ["254", "1678", "973"];
    const BLUE: [&str; 3] = ["604", "115", "5499"];

    fn event() -> EventKey {
        EventKey::new("2019casj")
    }

    fn reconciler() -> BracketReconciler {
        BracketReconciler::new(event(), PlayoffFormat::Bracket8Team)
    }

    fn key(level: CompLevel, set: u16, number: u16) -> MatchKey {
        MatchKey::new(event(), level, set, number)
    }

    fn teams(t: [&str; 3]) -> impl Iterator<Item = TeamKey> {
        t.into_iter().map(TeamKey::new)
    }

    fn scored(k: &MatchKey, red: u32, blue: u32) -> MatchPatch {
        MatchPatch::for_key(k)
            .with_alliance(Color::Red, AlliancePatch::scored(teams(RED), red))
            .with_alliance(Color::Blue, AlliancePatch::scored(teams(BLUE), blue))
    }

    fn scheduled(k: &MatchKey) -> MatchPatch {
        MatchPatch::for_key(k)
            .with_alliance(Color::Red, AlliancePatch::roster(teams(RED)))
            .with_alliance(Color::Blue, AlliancePatch::roster(teams(BLUE)))
    }

    fn store(existing: &mut BTreeMap<MatchKey, Match>, r: &Reconciliation) {
        for k in &r.to_delete {
            existing.remove(k);
        }
        for m in &r.to_upsert {
            existing.insert(m.key.clone(), m.clone());
        }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let qf = |n| key(CompLevel::Quarter, 1, n);
        let incoming = vec![
            scored(&qf(1), 200, 100),
            scored(&qf(2), 100, 180),
            scheduled(&qf(3)),
            scheduled(&key(CompLevel::Quarter, 2, 1)),
            scored(&key(CompLevel::Qual, 1, 12), 50, 40),
        ];
        let mut existing = BTreeMap::new();
        let first = reconciler().reconcile(&existing, &incoming).unwrap();
        assert_eq!(first.to_upsert.len(), 5);
        store(&mut existing, &first);

        let second = reconciler().reconcile(&existing, &incoming).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_stored_tiebreaker_pruned_after_sweep() {
        let qf = |n| key(CompLevel::Quarter, 1, n);
        let mut existing = BTreeMap::new();
        let first = reconciler()
            .reconcile(&existing, &[scheduled(&qf(1)), scheduled(&qf(2)), scheduled(&qf(3))])
            .unwrap();
        store(&mut existing, &first);
        assert_eq!(existing.len(), 3);

        let second = reconciler()
            .reconcile(&existing, &[scored(&qf(1), 200, 100), scored(&qf(2), 180, 90)])
            .unwrap();
        assert_eq!(second.to_delete, vec![qf(3)]);
        assert_eq!(second.to_upsert.len(), 2);
        assert_eq!(
            second.bracket.winner_of(CompLevel::Quarter, 1).unwrap().to_vec(),
            teams(RED).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_partial_patch_keeps_unreported_fields() {
        let k = key(CompLevel::Semi, 1, 1);
        let mut existing = BTreeMap::new();
        let mut stored = Match::placeholder(k.clone());
        stored.red.teams = teams(RED).collect();
        stored.blue.teams = teams(BLUE).collect();
        stored.score_breakdown = Some(serde_json::json!({"auto": 12}));
        existing.insert(k.clone(), stored);

        let mut patch = MatchPatch::for_key(&k);
        patch.red = Some(AlliancePatch {
            score: Some(Score::Points(88)),
            ..AlliancePatch::default()
        });
        let r = reconciler().reconcile(&existing, &[patch]).unwrap();
        let merged = &r.to_upsert[0];
        assert_eq!(merged.red.score, Score::Points(88));
        assert_eq!(merged.red.teams.len(), 3);
        assert_eq!(merged.blue.teams.len(), 3);
        assert_eq!(merged.blue.score, Score::Unplayed);
        assert!(merged.score_breakdown.is_some());
    }

    #[test]
    fn test_series_outside_format_is_invalid() {
        let octo = key(CompLevel::Eighth, 1, 1);
        let qf5 = key(CompLevel::Quarter, 5, 1);
        let mut existing = BTreeMap::new();
        existing.insert(octo.clone(), Match::placeholder(octo.clone()));

        let r = reconciler()
            .reconcile(&existing, &[scheduled(&qf5), scheduled(&octo)])
            .unwrap();
        assert_eq!(r.to_delete, vec![octo]);
        assert!(r.to_upsert.is_empty());
    }

    #[test]
    fn test_conflicting_identity_is_a_contract_error() {
        let mut patch = scheduled(&key(CompLevel::Quarter, 1, 1));
        patch.comp_level = CompLevel::Semi;
        let err = reconciler().reconcile(&BTreeMap::new(), &[patch]).unwrap_err();
        assert!(matches!(err, ReconcileError::ConflictingIdentity { .. }));
    }

    #[test]
    fn test_foreign_event_is_a_contract_error() {
        let other = MatchKey::new(EventKey::new("2019cada"), CompLevel::Qual, 1, 1);
        let err = reconciler()
            .reconcile(&BTreeMap::new(), &[scheduled(&other)])
            .unwrap_err();
        assert!(matches!(err, ReconcileError::ForeignEvent { .. }));
    }

    #[test]
    fn test_unparsable_key_is_skipped() {
        let mut patch = scheduled(&key(CompLevel::Qual, 1, 3));
        patch.key = "garbage".to_owned();
        let r = reconciler().reconcile(&BTreeMap::new(), &[patch]).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn test_roster_correction_is_last_write_wins() {
        let k = key(CompLevel::Final, 1, 1);
        let mut existing = BTreeMap::new();
        let first = reconciler().reconcile(&existing, &[scored(&k, 120, 100)]).unwrap();
        store(&mut existing, &first);

        let corrected = MatchPatch::for_key(&k).with_alliance(
            Color::Red,
            AlliancePatch::roster(["254", "1678", "604"].into_iter().map(TeamKey::new)),
        );
        let r = reconciler().reconcile(&existing, &[corrected]).unwrap();
        assert_eq!(r.to_upsert[0].red.teams[2], TeamKey::new("604"));
        assert_eq!(r.to_upsert[0].red.score, Score::Points(120));
    }
}
