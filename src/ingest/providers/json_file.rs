// src/ingest/providers/json_file.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedProvider;

/// Feed from a local JSON array, for offline builds and tests.
pub struct JsonFileProvider {
    mode: Mode,
}

enum Mode {
    Path(PathBuf),
    Inline(String),
}

impl JsonFileProvider {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            mode: Mode::Path(path.as_ref().to_path_buf()),
        }
    }

    pub fn from_fixture(content: &str) -> Self {
        Self {
            mode: Mode::Inline(content.to_string()),
        }
    }
}

#[async_trait]
impl FeedProvider for JsonFileProvider {
    async fn fetch_raw(&self) -> Result<Vec<Value>> {
        match &self.mode {
            Mode::Path(p) => {
                let body = tokio::fs::read_to_string(p)
                    .await
                    .with_context(|| format!("reading feed file {}", p.display()))?;
                super::parse_feed_body(&body)
            }
            Mode::Inline(s) => super::parse_feed_body(s),
        }
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
