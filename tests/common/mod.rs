// Shared test support: in-memory and always-failing Store substitutes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use media_vault::db::{MediaKind, MediaSummary, ScoreSummary, Store, StoreError};

pub struct StoredMedia {
    pub id: String,
    pub filename: String,
    pub content: Vec<u8>,
}

pub struct StoredScore {
    pub id: String,
    pub player_name: String,
    pub score: i64,
}

/// In-memory stand-in for the document store. Generates ObjectId-style
/// identifiers and preserves insertion order.
#[derive(Default)]
pub struct MemoryStore {
    media: Mutex<HashMap<&'static str, Vec<StoredMedia>>>,
    scores: Mutex<Vec<StoredScore>>,
}

impl MemoryStore {
    /// Raw stored payload for an id, for byte-level assertions.
    pub fn media_content(&self, kind: MediaKind, id: &str) -> Option<Vec<u8>> {
        self.media
            .lock()
            .unwrap()
            .get(kind.collection())
            .and_then(|records| records.iter().find(|r| r.id == id))
            .map(|r| r.content.clone())
    }

    pub fn media_count(&self, kind: MediaKind) -> usize {
        self.media
            .lock()
            .unwrap()
            .get(kind.collection())
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_media(
        &self,
        kind: MediaKind,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, StoreError> {
        let id = ObjectId::new().to_hex();
        self.media
            .lock()
            .unwrap()
            .entry(kind.collection())
            .or_default()
            .push(StoredMedia {
                id: id.clone(),
                filename: filename.to_string(),
                content,
            });
        Ok(id)
    }

    async fn list_media(
        &self,
        kind: MediaKind,
        limit: Option<i64>,
    ) -> Result<Vec<MediaSummary>, StoreError> {
        let map = self.media.lock().unwrap();
        let records = map.get(kind.collection()).map_or(&[][..], Vec::as_slice);
        let mut out: Vec<MediaSummary> = records
            .iter()
            .map(|r| MediaSummary {
                id: r.id.clone(),
                filename: r.filename.clone(),
            })
            .collect();
        if let Some(cap) = limit {
            out.truncate(cap as usize);
        }
        Ok(out)
    }

    async fn insert_score(&self, player_name: &str, score: i64) -> Result<String, StoreError> {
        let id = ObjectId::new().to_hex();
        self.scores.lock().unwrap().push(StoredScore {
            id: id.clone(),
            player_name: player_name.to_string(),
            score,
        });
        Ok(id)
    }

    async fn list_scores(&self, limit: Option<i64>) -> Result<Vec<ScoreSummary>, StoreError> {
        let scores = self.scores.lock().unwrap();
        let mut out: Vec<ScoreSummary> = scores
            .iter()
            .map(|s| ScoreSummary {
                id: s.id.clone(),
                player_name: s.player_name.clone(),
                score: s.score,
            })
            .collect();
        if let Some(cap) = limit {
            out.truncate(cap as usize);
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store whose every operation fails, for unreachable-store scenarios.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl Store for FailingStore {
    async fn insert_media(
        &self,
        _kind: MediaKind,
        _filename: &str,
        _content: Vec<u8>,
    ) -> Result<String, StoreError> {
        Err(unavailable())
    }

    async fn list_media(
        &self,
        _kind: MediaKind,
        _limit: Option<i64>,
    ) -> Result<Vec<MediaSummary>, StoreError> {
        Err(unavailable())
    }

    async fn insert_score(&self, _player_name: &str, _score: i64) -> Result<String, StoreError> {
        Err(unavailable())
    }

    async fn list_scores(&self, _limit: Option<i64>) -> Result<Vec<ScoreSummary>, StoreError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
