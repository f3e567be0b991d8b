// Document store access layer (MongoDB).

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, spec::BinarySubtype, Binary, Bson};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Which media collection an upload or listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Sprite,
    Audio,
}

impl MediaKind {
    /// Name of the backing collection.
    pub fn collection(&self) -> &'static str {
        match self {
            MediaKind::Sprite => "sprites",
            MediaKind::Audio => "audio",
        }
    }
}

/// Stored form of an uploaded file. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub filename: String,
    pub content: Binary,
}

/// Listing form of a media record. The type has no content field, so the
/// binary payload cannot cross the response boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
}

/// Stored form of a submitted player score. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub player_name: String,
    pub score: i64,
}

/// Listing form of a score record, identifier rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub player_name: String,
    pub score: i64,
}

// Wire shapes read back from the store before identifiers are stringified.

#[derive(Debug, Deserialize)]
struct MediaDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    filename: String,
}

impl From<MediaDoc> for MediaSummary {
    fn from(doc: MediaDoc) -> Self {
        Self {
            id: doc.id.to_hex(),
            filename: doc.filename,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    player_name: String,
    score: i64,
}

impl From<ScoreDoc> for ScoreSummary {
    fn from(doc: ScoreDoc) -> Self {
        Self {
            id: doc.id.to_hex(),
            player_name: doc.player_name,
            score: doc.score,
        }
    }
}

/// Errors surfaced by a [`Store`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Driver(#[from] mongodb::error::Error),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations the HTTP handlers depend on. Handlers receive an
/// implementation through `AppState`, so tests can substitute an in-memory
/// store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one uploaded file and return its generated identifier.
    async fn insert_media(
        &self,
        kind: MediaKind,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, StoreError>;

    /// List media records, binary payloads excluded, newest-unspecified
    /// store order, bounded by `limit` when set.
    async fn list_media(
        &self,
        kind: MediaKind,
        limit: Option<i64>,
    ) -> Result<Vec<MediaSummary>, StoreError>;

    /// Insert one player score and return its generated identifier.
    async fn insert_score(&self, player_name: &str, score: i64) -> Result<String, StoreError>;

    /// List score records, bounded by `limit` when set.
    async fn list_scores(&self, limit: Option<i64>) -> Result<Vec<ScoreSummary>, StoreError>;

    /// Liveness check against the store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// MongoDB-backed [`Store`].
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Build the client from the configured connection string. No retries;
    /// a malformed URI is fatal. The driver connects lazily, so liveness is
    /// checked separately via [`Store::ping`].
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        if config.connect_timeout.is_some() {
            options.server_selection_timeout = config.connect_timeout;
        }
        let client = Client::with_options(options)?;
        let db = client.database(&config.database);
        Ok(Self { client, db })
    }

    /// Underlying driver client, exposed so the entry point can shut it
    /// down once the server loop exits.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn media(&self, kind: MediaKind) -> Collection<MediaRecord> {
        self.db.collection(kind.collection())
    }
}

#[async_trait]
impl Store for Database {
    async fn insert_media(
        &self,
        kind: MediaKind,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<String, StoreError> {
        let record = MediaRecord {
            id: None,
            filename: filename.to_string(),
            content: Binary {
                subtype: BinarySubtype::Generic,
                bytes: content,
            },
        };
        let result = self.media(kind).insert_one(&record).await?;
        Ok(id_string(result.inserted_id))
    }

    async fn list_media(
        &self,
        kind: MediaKind,
        limit: Option<i64>,
    ) -> Result<Vec<MediaSummary>, StoreError> {
        let coll = self.db.collection::<MediaDoc>(kind.collection());
        // Project the payload away server-side; MediaDoc could not hold it
        // anyway.
        let mut find = coll.find(doc! {}).projection(doc! { "content": 0 });
        if let Some(cap) = limit {
            find = find.limit(cap);
        }
        let mut cursor = find.await?;
        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            out.push(doc.into());
        }
        Ok(out)
    }

    async fn insert_score(&self, player_name: &str, score: i64) -> Result<String, StoreError> {
        let record = ScoreRecord {
            id: None,
            player_name: player_name.to_string(),
            score,
        };
        let result = self
            .db
            .collection::<ScoreRecord>("scores")
            .insert_one(&record)
            .await?;
        Ok(id_string(result.inserted_id))
    }

    async fn list_scores(&self, limit: Option<i64>) -> Result<Vec<ScoreSummary>, StoreError> {
        let coll = self.db.collection::<ScoreDoc>("scores");
        let mut find = coll.find(doc! {});
        if let Some(cap) = limit {
            find = find.limit(cap);
        }
        let mut cursor = find.await?;
        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            out.push(doc.into());
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

/// Render a store-generated identifier as a string. Inserts always produce
/// ObjectIds here, but the fallback keeps odd Bson values printable.
fn id_string(id: Bson) -> String {
    id.as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|| id.to_string())
}
