//! # Date/City Organizer
//! Buckets classified meetings into a rolling window of calendar dates and,
//! for physical meetings, into city groups. Process statistics are collected
//! in the same pass.
//!
//! Pure and deterministic: same records + same reference date → same output.
//! No I/O, no logging; the pipeline reports on the returned [`ProcessStats`].

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::classify::{self, AttendanceCategory};
use crate::meeting::MeetingRecord;

/// Number of consecutive dates in the rolling window (reference date included).
pub const WINDOW_DAYS: u64 = 35;

/// A feed record plus what the classifier derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMeeting {
    #[serde(flatten)]
    pub record: MeetingRecord,
    pub city: String,
    pub attendance_category: AttendanceCategory,
}

/// City name → meetings at that city, keys in ordinal order.
pub type CityGroups = BTreeMap<String, Vec<ClassifiedMeeting>>;

/// One calendar date of the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub day_name: String,
    pub formatted_date: String,
    /// 0 = Sunday .. 6 = Saturday, from the calendar date.
    pub day_of_week: u8,
    pub online: Vec<ClassifiedMeeting>,
    pub in_person: CityGroups,
    pub hybrid: CityGroups,
}

impl DateBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            day_name: date.format("%A").to_string(),
            formatted_date: date.format("%B %-d, %Y").to_string(),
            day_of_week: weekday_index(date),
            online: Vec::new(),
            in_person: BTreeMap::new(),
            hybrid: BTreeMap::new(),
        }
    }

    /// ISO `YYYY-MM-DD`, also the daily page file stem.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn in_person_total(&self) -> usize {
        self.in_person.values().map(Vec::len).sum()
    }

    pub fn hybrid_total(&self) -> usize {
        self.hybrid.values().map(Vec::len).sum()
    }

    pub fn total(&self) -> usize {
        self.online.len() + self.in_person_total() + self.hybrid_total()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn push(&mut self, meeting: ClassifiedMeeting) {
        match meeting.attendance_category {
            AttendanceCategory::Online => self.online.push(meeting),
            AttendanceCategory::InPerson => self
                .in_person
                .entry(meeting.city.clone())
                .or_default()
                .push(meeting),
            AttendanceCategory::Hybrid => self
                .hybrid
                .entry(meeting.city.clone())
                .or_default()
                .push(meeting),
            // Unrecognized explicit options have no section to go to.
            AttendanceCategory::Other(_) => {}
        }
    }

    fn sort(&mut self) {
        sort_by_time(&mut self.online);
        for list in self.in_person.values_mut().chain(self.hybrid.values_mut()) {
            sort_by_time(list);
        }
    }
}

/// Counters collected while organizing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub total_processed: usize,
    pub skipped_incomplete: usize,
    pub online_count: usize,
    pub in_person_count: usize,
    pub hybrid_count: usize,
    pub cities_found: BTreeSet<String>,
}

impl ProcessStats {
    /// Records that landed in one of the three known categories.
    pub fn included(&self) -> usize {
        self.online_count + self.in_person_count + self.hybrid_count
    }
}

/// Result of one organizing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organized {
    /// Chronological.
    pub buckets: BTreeMap<NaiveDate, DateBucket>,
    pub stats: ProcessStats,
}

impl Organized {
    pub fn non_empty_buckets(&self) -> impl Iterator<Item = &DateBucket> {
        self.buckets.values().filter(|b| !b.is_empty())
    }

    pub fn days_with_meetings(&self) -> usize {
        self.non_empty_buckets().count()
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The [`WINDOW_DAYS`] dates starting at `reference`.
pub fn window_dates(reference: NaiveDate) -> Vec<NaiveDate> {
    (0..WINDOW_DAYS)
        .filter_map(|offset| reference.checked_add_days(Days::new(offset)))
        .collect()
}

/// Bucket `records` into the rolling window starting at `reference`.
pub fn organize(records: &[MeetingRecord], reference: NaiveDate) -> Organized {
    let mut buckets: BTreeMap<NaiveDate, DateBucket> = window_dates(reference)
        .into_iter()
        .map(|d| (d, DateBucket::empty(d)))
        .collect();
    let mut stats = ProcessStats::default();

    for record in records {
        stats.total_processed += 1;

        if !classify::is_eligible(record) {
            stats.skipped_incomplete += 1;
            continue;
        }

        // Day-less records are dropped without being counted anywhere else.
        let Some(day) = record.day else {
            continue;
        };

        let c = classify::classify(record);
        stats.cities_found.insert(c.city.clone());
        match c.category {
            AttendanceCategory::Online => stats.online_count += 1,
            AttendanceCategory::InPerson => stats.in_person_count += 1,
            AttendanceCategory::Hybrid => stats.hybrid_count += 1,
            AttendanceCategory::Other(_) => {}
        }

        let meeting = ClassifiedMeeting {
            record: record.clone(),
            city: c.city,
            attendance_category: c.category,
        };
        for bucket in buckets.values_mut().filter(|b| b.day_of_week == day) {
            bucket.push(meeting.clone());
        }
    }

    for bucket in buckets.values_mut() {
        bucket.sort();
    }

    Organized { buckets, stats }
}

/// Stable lexicographic sort on the raw time string.
fn sort_by_time(list: &mut [ClassifiedMeeting]) {
    list.sort_by(|a, b| a.record.time_key().cmp(b.record.time_key()));
}
