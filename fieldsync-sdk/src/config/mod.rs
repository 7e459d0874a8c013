//! Configuration shapes shared between the engine and its deployments.
//!
//! Only the shapes live here; loading and validation belong to whichever
//! binary reads the configuration.

pub mod season;

pub use season::{FormatVersion, HeaderProbe, RecordLayout, SeasonLayout, SortOrderInfo};
