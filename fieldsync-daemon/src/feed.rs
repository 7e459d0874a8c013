//! Directory-backed feed.
//!
//! An external fetcher drops the upstream's current view of each event at
//! `<snapshot_dir>/<event>.json`; every poll rereads it.

use async_trait::async_trait;
use fieldsync_core::processors::{FeedFetcher, FetchError};
use fieldsync_sdk::objects::{EventKey, FeedSnapshot};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct DirectoryFeed {
    root: PathBuf,
}

impl DirectoryFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn snapshot_path(&self, event: &EventKey) -> PathBuf {
        self.root.join(format!("{}.json", event.as_str()))
    }
}

#[async_trait]
impl FeedFetcher for DirectoryFeed {
    async fn fetch(&self, event: &EventKey) -> Result<FeedSnapshot, FetchError> {
        let path = self.snapshot_path(event);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FetchError::NotFound(event.clone()));
            }
            Err(e) => return Err(FetchError::Io(e)),
        };
        debug!(%event, path = %path.display(), bytes = bytes.len(), "Read feed snapshot");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fieldsync-feed-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_snapshot_file() {
        let dir = scratch_dir("read");
        std::fs::write(
            dir.join("2019casj.json"),
            r#"{
                "event": "2019casj",
                "year": 2019,
                "teams": ["frc254", "frc604"],
                "matches": [
                    {
                        "key": "2019casj_qm1",
                        "comp_level": "qm",
                        "match_number": 1,
                        "red": { "teams": ["frc254", "frc1678", "frc973"], "score": 80 },
                        "blue": { "teams": ["frc604", "frc115", "frc5499"], "score": 60 }
                    }
                ]
            }"#,
        )
        .unwrap();

        let feed = DirectoryFeed::new(&dir);
        let snapshot = feed.fetch(&EventKey::new("2019casj")).await.unwrap();
        assert_eq!(snapshot.year, 2019);
        assert_eq!(snapshot.teams.len(), 2);
        assert_eq!(snapshot.matches.len(), 1);
        assert!(snapshot.rankings.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_and_malformed_snapshots() {
        let dir = scratch_dir("errors");
        let feed = DirectoryFeed::new(&dir);

        let missing = feed.fetch(&EventKey::new("2024txhou")).await;
        assert!(matches!(missing, Err(FetchError::NotFound(_))));

        std::fs::write(dir.join("2024txhou.json"), "{ not json").unwrap();
        let malformed = feed.fetch(&EventKey::new("2024txhou")).await;
        assert!(matches!(malformed, Err(FetchError::Decode(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
