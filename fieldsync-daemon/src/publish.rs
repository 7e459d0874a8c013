//! JSON-lines publisher.
//!
//! Appends every publication as one line to `<output_dir>/<event>.jsonl` and
//! logs the status sentence of each team the publication touched.

use async_trait::async_trait;
use fieldsync_core::events::Publication;
use fieldsync_core::processors::{PublishError, Publisher};
use fieldsync_core::{EventState, describe};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub struct JsonLinesPublisher {
    root: PathBuf,
}

impl JsonLinesPublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn log_path(&self, publication: &Publication) -> PathBuf {
        self.root.join(format!("{}.jsonl", publication.event.as_str()))
    }
}

#[async_trait]
impl Publisher for JsonLinesPublisher {
    async fn publish(
        &self,
        publication: &Publication,
        state: &EventState,
    ) -> Result<(), PublishError> {
        let mut line = serde_json::to_vec(publication)?;
        line.push(b'\n');

        tokio::fs::create_dir_all(&self.root).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(publication))
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        for team in publication.affected_teams() {
            let sentence = describe(&state.status(&team));
            info!(event = %publication.event, %team, status = %sentence, "Team status");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_sdk::objects::{
        Color, CompLevel, EventKey, Match, MatchKey, PlayoffFormat, Score, TeamKey,
    };

    #[tokio::test]
    async fn test_appends_one_line_per_publication() {
        let dir = std::env::temp_dir().join(format!("fieldsync-publish-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let event = EventKey::new("2019casj");
        let key = MatchKey::new(event.clone(), CompLevel::Qual, 1, 1);

        let mut m = Match::placeholder(key.clone());
        let red = m.alliance_mut(Color::Red);
        red.teams = ["254", "1678", "973"].into_iter().map(TeamKey::new).collect();
        red.score = Score::Points(80);
        m.blue.score = Score::Points(60);

        let mut publication = Publication::empty(event.clone(), 2019, PlayoffFormat::Bracket8Team);
        publication.to_upsert.push(m);
        let mut state = EventState::new(event, 2019, PlayoffFormat::Bracket8Team);
        state.apply(&publication);

        let publisher = JsonLinesPublisher::new(&dir);
        publisher.publish(&publication, &state).await.unwrap();
        publisher.publish(&publication, &state).await.unwrap();

        let written = std::fs::read_to_string(dir.join("2019casj.jsonl")).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let decoded: Publication = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(decoded.to_upsert[0].key, key);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
