//! # Calendar-Day Organizer
//! Alternate grouping for the month-calendar page: every day of one calendar
//! month gets the meetings whose weekday matches. No classification, no stats.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::meeting::MeetingRecord;
use crate::organize::weekday_index;

/// Month metadata the calendar renderer lays its grid out with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarInfo {
    /// English month name, e.g. "October".
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub days_in_month: u32,
    /// Weekday of the 1st, 0 = Sunday.
    pub first_day_of_week: u8,
}

impl CalendarInfo {
    /// `None` for a month chrono cannot represent.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self {
            month: first.format("%B").to_string(),
            year,
            month_number: month,
            days_in_month: days_in_month(year, month)?,
            first_day_of_week: weekday_index(first),
        })
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Day of month (1-based) → meetings on that date, sorted by place then time.
///
/// An invalid `(year, month)` yields an empty map.
pub fn organize_by_calendar_day(
    records: &[MeetingRecord],
    year: i32,
    month: u32,
) -> BTreeMap<u32, Vec<MeetingRecord>> {
    let Some(n) = days_in_month(year, month) else {
        return BTreeMap::new();
    };

    let mut by_day: BTreeMap<u32, Vec<MeetingRecord>> = BTreeMap::new();
    for d in 1..=n {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, d) else {
            continue;
        };
        let weekday = weekday_index(date);
        let mut list: Vec<MeetingRecord> = records
            .iter()
            .filter(|r| r.day == Some(weekday))
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            place_key(a)
                .cmp(place_key(b))
                .then_with(|| a.time_key().cmp(b.time_key()))
        });
        by_day.insert(date.day(), list);
    }
    by_day
}

/// `location` when the feed has the key at all, else `region`.
fn place_key(r: &MeetingRecord) -> &str {
    r.location
        .as_deref()
        .or(r.region.as_deref())
        .unwrap_or("")
}
