// src/ingest/types.rs
use anyhow::Result;
use serde_json::Value;

use crate::meeting::MeetingRecord;

/// Where the raw meeting list comes from.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// The feed's top-level JSON array, elements untouched.
    async fn fetch_raw(&self) -> Result<Vec<Value>>;
    fn name(&self) -> &'static str;
}

/// A fetched feed: the raw array (for the backup) and the decoded records.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub raw: Vec<Value>,
    pub records: Vec<MeetingRecord>,
}

impl Feed {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
