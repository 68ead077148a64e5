// src/sink.rs
//! Where generated files go. The build writes through an [`ArtifactSink`] so
//! tests can capture output in memory.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `content` under a `/`-separated relative path, creating parents.
    async fn store(&self, rel_path: &str, content: String) -> Result<()>;

    /// Human readable location of a stored path, for logs and the summary.
    fn describe(&self, rel_path: &str) -> String;
}

/// Writes into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel_path: &str) -> PathBuf {
        rel_path
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }
}

#[async_trait::async_trait]
impl ArtifactSink for DirSink {
    async fn store(&self, rel_path: &str, content: String) -> Result<()> {
        let path = self.resolve(rel_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("writing {}", path.display()))
    }

    fn describe(&self, rel_path: &str) -> String {
        self.resolve(rel_path).display().to_string()
    }
}

/// Keeps every stored file in memory, keyed by relative path.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Mutex<BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rel_path: &str) -> Option<String> {
        self.files.lock().ok()?.get(rel_path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ArtifactSink for MemorySink {
    async fn store(&self, rel_path: &str, content: String) -> Result<()> {
        self.files
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink mutex poisoned"))?
            .insert(rel_path.to_string(), content);
        Ok(())
    }

    fn describe(&self, rel_path: &str) -> String {
        format!("memory:{rel_path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_ignores_traversal() {
        let s = DirSink::new("/tmp/site");
        assert_eq!(
            s.resolve("daily/../../etc/2026-10-20.html"),
            PathBuf::from("/tmp/site/daily/etc/2026-10-20.html")
        );
    }

    #[tokio::test]
    async fn dir_sink_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let s = DirSink::new(tmp.path());
        s.store("css/styles.css", "body{}".into()).await.unwrap();
        let got = std::fs::read_to_string(tmp.path().join("css/styles.css")).unwrap();
        assert_eq!(got, "body{}");
    }

    #[tokio::test]
    async fn memory_sink_keeps_latest_content_per_path() {
        let s = MemorySink::new();
        s.store("index.html", "old".into()).await.unwrap();
        s.store("daily/2026-10-20.html", "day".into()).await.unwrap();
        s.store("index.html", "new".into()).await.unwrap();
        assert_eq!(s.get("index.html").as_deref(), Some("new"));
        assert_eq!(s.paths(), vec!["daily/2026-10-20.html", "index.html"]);
        assert_eq!(s.describe("index.html"), "memory:index.html");
        assert!(s.get("missing.html").is_none());
    }
}
