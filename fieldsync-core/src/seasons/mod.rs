//! Season layout registry.
//!
//! Column semantics of a ranking export drift from season to season. Rather
//! than branching on literal years in the normalizer, every known export
//! layout is an entry keyed by `(year, FormatVersion)`, and the normalizer
//! asks the registry once per table which entry applies.

mod builtin;

use fieldsync_sdk::config::{FormatVersion, SeasonLayout};
use lazy_static::lazy_static;
use std::collections::BTreeMap;
use tracing::warn;

lazy_static! {
    static ref BUILTIN: SeasonRegistry = SeasonRegistry::from_layouts(builtin::layouts());
}

/// An immutable set of season layouts.
#[derive(Debug, Clone, Default)]
pub struct SeasonRegistry {
    layouts: BTreeMap<(u16, FormatVersion), SeasonLayout>,
}

impl SeasonRegistry {
    /// The layouts shipped with the engine.
    pub fn builtin() -> &'static SeasonRegistry {
        &BUILTIN
    }

    pub fn from_layouts(layouts: impl IntoIterator<Item = SeasonLayout>) -> Self {
        let mut registry = Self::default();
        for layout in layouts {
            registry.insert(layout);
        }
        registry
    }

    /// A copy of the builtin registry with `overrides` replacing entries
    /// that share their `(year, format)`.
    pub fn with_overrides(overrides: impl IntoIterator<Item = SeasonLayout>) -> Self {
        let mut registry = Self::builtin().clone();
        for layout in overrides {
            registry.insert(layout);
        }
        registry
    }

    fn insert(&mut self, layout: SeasonLayout) {
        if !layout.sort_order_info.is_empty()
            && layout.sort_order_info.len() != layout.sort_orders.len()
        {
            warn!(
                year = layout.year,
                format = ?layout.format,
                sort_orders = layout.sort_orders.len(),
                sort_order_info = layout.sort_order_info.len(),
                "Season layout sort orders and display metadata differ in length"
            );
        }
        if layout.format != FormatVersion::Standard && layout.detect.is_none() {
            warn!(
                year = layout.year,
                format = ?layout.format,
                "Non-standard season layout has no header probe and will never be selected"
            );
        }
        self.layouts.insert((layout.year, layout.format), layout);
    }

    pub fn get(&self, year: u16, format: FormatVersion) -> Option<&SeasonLayout> {
        self.layouts.get(&(year, format))
    }

    /// Pick the layout for a table: the first non-standard variant whose
    /// header probe matches, falling back to the season's standard layout.
    pub fn resolve(&self, year: u16, header: &[String]) -> Option<&SeasonLayout> {
        self.layouts
            .range((year, FormatVersion::Standard)..=(year, FormatVersion::Offseason))
            .map(|(_, layout)| layout)
            .filter(|layout| layout.format != FormatVersion::Standard)
            .find(|layout| layout.detect.as_ref().is_some_and(|p| p.matches(header)))
            .or_else(|| self.get(year, FormatVersion::Standard))
    }
}
