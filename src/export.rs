// src/export.rs
//! JSON artifacts for client-side search and downstream consumers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::classify::{self, AttendanceCategory};
use crate::ingest::normalize_text;
use crate::meeting::MeetingRecord;
use crate::organize::{DateBucket, Organized, ProcessStats};

pub const SEARCH_INDEX_FILE: &str = "search-index.json";
pub const OPTIMIZED_FILE: &str = "meetings-optimized.json";
pub const BACKUP_FILE: &str = "meetings-backup.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Flattened, search-friendly view of one meeting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub id: String,
    pub name: String,
    pub day: u8,
    pub time: String,
    pub time_formatted: String,
    pub city: String,
    pub address: String,
    pub types: Vec<String>,
    pub attendance_option: AttendanceCategory,
    pub conference_url: String,
    pub entity: String,
    pub searchable_text: String,
    pub coordinates: Coordinates,
}

/// One entry per record that passes the inclusion test, in feed order.
pub fn search_index(records: &[MeetingRecord]) -> Vec<SearchEntry> {
    records
        .iter()
        .filter(|r| classify::is_eligible(r))
        .map(|r| {
            let c = classify::classify(r);
            SearchEntry {
                id: entry_id(r),
                name: r.name.clone().unwrap_or_default(),
                day: r.day.unwrap_or(0),
                time: r.time.clone().unwrap_or_default(),
                time_formatted: r.time_formatted.clone().unwrap_or_default(),
                city: c.city,
                address: r.formatted_address.clone().unwrap_or_default(),
                types: r.types.clone(),
                attendance_option: c.category,
                conference_url: r.conference_url.clone().unwrap_or_default(),
                entity: r.entity.clone().unwrap_or_default(),
                searchable_text: searchable_text(r),
                coordinates: Coordinates {
                    lat: r.latitude,
                    lng: r.longitude,
                },
            }
        })
        .collect()
}

/// Lower-cased bag of words a client filters on.
pub fn searchable_text(r: &MeetingRecord) -> String {
    let notes = r.notes.as_deref().map(normalize_text).unwrap_or_default();
    let types = r.types.join(" ");
    [
        r.name.as_deref().unwrap_or(""),
        r.formatted_address.as_deref().unwrap_or(""),
        r.region.as_deref().unwrap_or(""),
        r.entity.as_deref().unwrap_or(""),
        types.as_str(),
        notes.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// `slug` when present, otherwise a short hash that stays the same across builds.
fn entry_id(r: &MeetingRecord) -> String {
    if let Some(slug) = r.slug.as_deref().filter(|s| !s.is_empty()) {
        return slug.to_string();
    }
    use sha2::{Digest, Sha256};
    let day = r.day.map(|d| d.to_string()).unwrap_or_default();
    let mut hasher = Sha256::new();
    for part in [
        r.name.as_deref().unwrap_or(""),
        day.as_str(),
        r.time.as_deref().unwrap_or(""),
        r.formatted_address.as_deref().unwrap_or(""),
        r.conference_url.as_deref().unwrap_or(""),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(18);
    out.push_str("m-");
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Date buckets and stats in one document.
#[derive(Debug, Serialize)]
pub struct OptimizedBundle<'a> {
    pub meetings_by_date: &'a BTreeMap<NaiveDate, DateBucket>,
    pub process_stats: &'a ProcessStats,
    pub generated_at: String,
    pub total_meetings: usize,
}

impl<'a> OptimizedBundle<'a> {
    pub fn new(organized: &'a Organized, generated_at: String) -> Self {
        Self {
            meetings_by_date: &organized.buckets,
            process_stats: &organized.stats,
            generated_at,
            total_meetings: organized.stats.included(),
        }
    }
}

pub fn search_index_json(records: &[MeetingRecord]) -> Result<(String, usize)> {
    let index = search_index(records);
    let body = serde_json::to_string_pretty(&index).context("serializing search index")?;
    Ok((body, index.len()))
}

pub fn optimized_json(organized: &Organized, generated_at: String) -> Result<String> {
    serde_json::to_string_pretty(&OptimizedBundle::new(organized, generated_at))
        .context("serializing optimized bundle")
}

/// The feed exactly as received.
pub fn backup_json(raw: &[Value]) -> Result<String> {
    serde_json::to_string_pretty(raw).context("serializing raw backup")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_prefers_slug_then_stable_hash() {
        let mut r = MeetingRecord {
            name: Some("Big Book".into()),
            day: Some(2),
            time: Some("19:00".into()),
            ..Default::default()
        };
        let a = entry_id(&r);
        assert!(a.starts_with("m-"));
        assert_eq!(a.len(), 18);
        assert_eq!(a, entry_id(&r.clone()));
        r.slug = Some("big-book-tuesday".into());
        assert_eq!(entry_id(&r), "big-book-tuesday");
    }

    #[test]
    fn searchable_text_skips_empty_parts() {
        let r = MeetingRecord {
            name: Some("Big Book".into()),
            region: Some("Ballard".into()),
            types: vec!["O".into(), "BB".into()],
            notes: Some("<p>Use&nbsp;side door</p>".into()),
            ..Default::default()
        };
        assert_eq!(searchable_text(&r), "big book ballard o bb use side door");
    }
}
