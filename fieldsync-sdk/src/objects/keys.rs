//! Identity keys for teams and events.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A team's identity at an event.
///
/// Feeds disagree on whether team identifiers carry the `frc` prefix, so the
/// key is normalized on construction: surrounding whitespace is trimmed and a
/// leading `frc` (any case) is dropped. `"frc254"` and `"254"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "CompactString", into = "CompactString")]
pub struct TeamKey(CompactString);

impl TeamKey {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let bare = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("frc") => &trimmed[3..],
            _ => trimmed,
        };
        Self(CompactString::from(bare))
    }

    /// The bare team number as it appears in rendered text.
    pub fn number(&self) -> &str {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<CompactString> for TeamKey {
    fn from(value: CompactString) -> Self {
        Self::new(&value)
    }
}

impl From<TeamKey> for CompactString {
    fn from(value: TeamKey) -> Self {
        value.0
    }
}

impl From<&str> for TeamKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for TeamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event identity such as `2019casj`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(CompactString);

impl EventKey {
    pub fn new(raw: &str) -> Self {
        Self(CompactString::from(raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The season encoded in the first four characters, if any.
    pub fn year(&self) -> Option<u16> {
        self.0.get(..4).and_then(|y| y.parse().ok())
    }
}

impl From<&str> for EventKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_key_strips_prefix() {
        assert_eq!(TeamKey::new("frc254"), TeamKey::new("254"));
        assert_eq!(TeamKey::new(" FRC1114 ").number(), "1114");
        assert_eq!(TeamKey::new("fr").number(), "fr");
    }

    #[test]
    fn test_team_key_deserializes_normalized() {
        let key: TeamKey = serde_json::from_str("\"frc971\"").unwrap();
        assert_eq!(key.number(), "971");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"971\"");
    }

    #[test]
    fn test_event_year() {
        assert_eq!(EventKey::new("2019casj").year(), Some(2019));
        assert_eq!(EventKey::new("cmp").year(), None);
    }
}
