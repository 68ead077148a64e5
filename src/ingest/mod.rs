// src/ingest/mod.rs
pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::ingest::types::{Feed, FeedProvider};
use crate::meeting::MeetingRecord;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_records_total", "Raw entries received from the feed.");
        describe_counter!(
            "feed_records_rejected_total",
            "Feed entries that could not be decoded as records."
        );
        describe_counter!("feed_fetch_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_fetch_ms", "Feed fetch time in milliseconds.");
    });
}

/// Meeting notes arrive as WordPress HTML. Reduce them to one line of plain
/// text: entities decoded, tags dropped, curly quotes folded, whitespace
/// collapsed.
pub fn normalize_text(s: &str) -> String {
    static TAG: OnceCell<regex::Regex> = OnceCell::new();
    static SPACE: OnceCell<regex::Regex> = OnceCell::new();
    let tag = TAG.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let space = SPACE.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s);
    // Tags become spaces so "a<br>b" keeps two words.
    let plain = tag
        .replace_all(&decoded, " ")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    space.replace_all(&plain, " ").trim().to_string()
}

/// Decode feed entries into records. Entries that are not objects are dropped
/// here (they stay in the raw backup).
pub fn decode_records(raw: &[Value]) -> Vec<MeetingRecord> {
    let mut out = Vec::with_capacity(raw.len());
    for (idx, v) in raw.iter().enumerate() {
        match MeetingRecord::from_value(v.clone()) {
            Ok(r) => out.push(r),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "dropping undecodable feed entry");
                counter!("feed_records_rejected_total").increment(1);
            }
        }
    }
    out
}

/// Every key that appears on any object in the feed, sorted.
pub fn field_names(raw: &[Value]) -> Vec<String> {
    raw.iter()
        .filter_map(Value::as_object)
        .flat_map(|o| o.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fetch the feed once. An error or an empty feed is fatal: there is no
/// fallback data to build from.
pub async fn fetch_feed(provider: &dyn FeedProvider) -> Result<Feed> {
    ensure_metrics_described();

    let raw = provider
        .fetch_raw()
        .await
        .with_context(|| format!("fetching meetings from {}", provider.name()))?;
    if raw.is_empty() {
        counter!("feed_fetch_errors_total").increment(1);
        anyhow::bail!("no meetings data received from {}", provider.name());
    }

    counter!("feed_records_total").increment(raw.len() as u64);
    let records = decode_records(&raw);
    tracing::info!(
        provider = provider.name(),
        entries = raw.len(),
        records = records.len(),
        "feed loaded"
    );
    Ok(Feed { raw, records })
}
