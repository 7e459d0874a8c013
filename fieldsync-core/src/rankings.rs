//! RankingNormalizer.
//!
//! Turns one raw, season-specific ranking export into canonical [`Ranking`]
//! records. Column meaning comes from the [`SeasonRegistry`], resolved once per
//! table, with literal `played` / `dq` header cells taking precedence over the
//! registry's indices.
//!
//! The normalizer never fails on feed input. An export it cannot map yields an
//! empty list, which callers read as "format unsupported".

use crate::seasons::SeasonRegistry;
use fieldsync_sdk::config::RecordLayout;
use fieldsync_sdk::objects::{RawRankingTable, Ranking, TeamKey, WinLossRecord};
use std::sync::Arc;
use tracing::{debug, warn};

const RANK_COLUMN: usize = 0;
const TEAM_COLUMN: usize = 1;

/// Column indices resolved for one table.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedColumns {
    matches_played: usize,
    dq: Option<usize>,
    record: RecordLayout,
    qual_average: Option<usize>,
    sort_orders: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RankingNormalizer {
    registry: Arc<SeasonRegistry>,
}

impl RankingNormalizer {
    pub fn new(registry: Arc<SeasonRegistry>) -> Self {
        Self { registry }
    }

    /// Normalize `table` as an export of season `year`.
    ///
    /// Output rows keep the table's row order; the feed's rank is copied, not
    /// recomputed.
    pub fn normalize(&self, year: u16, table: &RawRankingTable) -> Vec<Ranking> {
        let Some(columns) = self.resolve_columns(year, &table.header) else {
            return Vec::new();
        };

        table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let ranking = parse_row(row, &columns);
                if ranking.is_none() {
                    warn!(year, row = index, "Skipping unparsable ranking row");
                }
                ranking
            })
            .collect()
    }

    fn resolve_columns(&self, year: u16, header: &[String]) -> Option<ResolvedColumns> {
        let Some(layout) = self.registry.resolve(year, header) else {
            debug!(year, "No season layout for ranking export");
            return None;
        };
        let Some(matches_played) = header_column(header, "played").or(layout.matches_played)
        else {
            debug!(
                year,
                format = ?layout.format,
                "Season layout has no matches-played column"
            );
            return None;
        };

        Some(ResolvedColumns {
            matches_played,
            dq: header_column(header, "dq").or(layout.dq),
            record: layout.record,
            qual_average: layout.qual_average,
            sort_orders: layout.sort_orders.clone(),
        })
    }
}

impl Default for RankingNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(SeasonRegistry::builtin().clone()))
    }
}

/// Normalize against the builtin season registry.
pub fn normalize(year: u16, table: &RawRankingTable) -> Vec<Ranking> {
    RankingNormalizer::default().normalize(year, table)
}

fn header_column(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case(name))
}

fn parse_row(row: &[String], columns: &ResolvedColumns) -> Option<Ranking> {
    let rank = parse_count(cell(row, RANK_COLUMN)?)?;
    let team = cell(row, TEAM_COLUMN).filter(|c| !c.is_empty())?;
    let matches_played = parse_count(cell(row, columns.matches_played)?)?;

    Some(Ranking {
        rank,
        team: TeamKey::new(team),
        record: parse_record(row, columns.record),
        qual_average: columns
            .qual_average
            .and_then(|i| cell(row, i))
            .and_then(parse_float),
        matches_played,
        dq: columns
            .dq
            .and_then(|i| cell(row, i))
            .and_then(parse_count)
            .unwrap_or(0),
        sort_orders: columns
            .sort_orders
            .iter()
            .map(|i| cell(row, *i).and_then(parse_float).unwrap_or(0.0))
            .collect(),
    })
}

fn parse_record(row: &[String], layout: RecordLayout) -> Option<WinLossRecord> {
    match layout {
        RecordLayout::None => None,
        RecordLayout::Columns([w, l, t]) => Some(WinLossRecord::new(
            parse_count(cell(row, w)?)?,
            parse_count(cell(row, l)?)?,
            parse_count(cell(row, t)?)?,
        )),
        RecordLayout::Composite(index) => {
            let mut parts = cell(row, index)?.split('-').map(parse_count);
            let record = WinLossRecord::new(parts.next()??, parts.next()??, parts.next()??);
            parts.next().is_none().then_some(record)
        }
    }
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(|c| c.trim())
}

/// Counts are sometimes exported as `10.0`.
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX))
            .then_some(value as u32)
    })
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
