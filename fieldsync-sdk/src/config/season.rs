//! Season ranking-export layouts.
//!
//! A layout says which columns of a season's raw ranking table carry which
//! meaning. Layouts are plain configuration: the engine ships a builtin set,
//! and deployments may add or replace entries without code changes.
//!
//! `sort_order_info` is the presentation metadata for the same columns. It
//! has to change together with `sort_orders`; nothing enforces that beyond a
//! length check at registry construction.

use serde::{Deserialize, Serialize};

/// Which variant of a season's export a layout describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    #[default]
    Standard,
    Offseason,
}

/// How a season reports win/loss/tie records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// The season has no win/loss concept.
    #[default]
    None,
    /// Separate wins, losses, and ties columns.
    Columns([usize; 3]),
    /// One `W-L-T` column.
    Composite(usize),
}

/// Identifies a non-standard export by one of its header cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderProbe {
    pub column: usize,
    pub header: String,
}

impl HeaderProbe {
    pub fn matches(&self, header: &[String]) -> bool {
        header
            .get(self.column)
            .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(self.header.trim()))
    }
}

/// Display metadata for one sort-order column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrderInfo {
    pub name: String,
    pub precision: u8,
}

impl SortOrderInfo {
    pub fn new(name: impl Into<String>, precision: u8) -> Self {
        Self {
            name: name.into(),
            precision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLayout {
    pub year: u16,
    #[serde(default)]
    pub format: FormatVersion,
    /// Required for non-standard formats; selects this layout when it matches.
    #[serde(default)]
    pub detect: Option<HeaderProbe>,
    #[serde(default)]
    pub matches_played: Option<usize>,
    #[serde(default)]
    pub record: RecordLayout,
    #[serde(default)]
    pub dq: Option<usize>,
    /// Set only for seasons ranked by average score.
    #[serde(default)]
    pub qual_average: Option<usize>,
    #[serde(default)]
    pub sort_orders: Vec<usize>,
    #[serde(default)]
    pub sort_order_info: Vec<SortOrderInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_toml() {
        let toml_str = r#"
year = 2016
format = "offseason"
matches_played = 8
record = { composite = 7 }
sort_orders = [3, 2, 4, 5, 6]
detect = { column = 2, header = "Auto" }

[[sort_order_info]]
name = "Ranking Score"
precision = 0
"#;
        let layout: SeasonLayout = toml::from_str(toml_str).unwrap();
        assert_eq!(layout.format, FormatVersion::Offseason);
        assert_eq!(layout.record, RecordLayout::Composite(7));
        assert_eq!(layout.dq, None);
        assert!(layout.detect.unwrap().matches(&[
            "Rank".to_owned(),
            "Team".to_owned(),
            " auto ".to_owned()
        ]));
    }

    #[test]
    fn test_record_layout_variants() {
        #[derive(Deserialize)]
        struct Wrapper {
            record: RecordLayout,
        }
        let w: Wrapper = toml::from_str(r#"record = "none""#).unwrap();
        assert_eq!(w.record, RecordLayout::None);
        let w: Wrapper = toml::from_str("record = { columns = [2, 3, 4] }").unwrap();
        assert_eq!(w.record, RecordLayout::Columns([2, 3, 4]));
    }
}
