//! Metadata records, id-aligned with the vector index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::vector::RecordId;

/// Input for one indexed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Full transcript text; this is what gets encoded
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewRecord {
    pub fn new(title: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            video_id: None,
            transcript: transcript.into(),
            url: None,
        }
    }

    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A stored record. Never updated or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedRecord {
    pub id: RecordId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub indexed_at: DateTime<Utc>,
}

/// Append-only record store
#[derive(Debug, Default, Clone)]
pub struct MetadataStore {
    records: Vec<IndexedRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, assigning the next sequential id
    pub fn append(&mut self, record: NewRecord) -> RecordId {
        let id = self.records.len() as RecordId;
        self.records.push(IndexedRecord {
            id,
            title: record.title,
            video_id: record.video_id,
            transcript: record.transcript,
            url: record.url,
            indexed_at: Utc::now(),
        });
        id
    }

    pub fn get(&self, id: RecordId) -> Result<&IndexedRecord> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.records.get(i))
            .ok_or(IndexError::OutOfRange {
                id,
                len: self.records.len(),
            })
    }

    /// All records in id order
    pub fn iter(&self) -> impl Iterator<Item = &IndexedRecord> {
        self.records.iter()
    }
}
