//! # Record Classifier
//! Pure derivations over a [`MeetingRecord`]: the city a meeting is listed under
//! and how people attend it. Nothing here fails; missing data falls back to
//! defaults.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::meeting::MeetingRecord;

/// City used when neither the address nor the region yields one.
pub const UNKNOWN_CITY: &str = "Unknown Location";

/// How a meeting is attended.
///
/// `Other` carries an explicit `attendance_option` the feed sent that is not
/// one of the three known values (kept verbatim), or the empty string when the
/// record has neither address nor conference URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttendanceCategory {
    Online,
    InPerson,
    Hybrid,
    Other(String),
}

impl AttendanceCategory {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "online" => Self::Online,
            "in_person" => Self::InPerson,
            "hybrid" => Self::Hybrid,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::InPerson => "in_person",
            Self::Hybrid => "hybrid",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for AttendanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AttendanceCategory {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Output of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub city: String,
    pub category: AttendanceCategory,
}

/// A record takes part in bucketing only if it can be attended somewhere.
pub fn is_eligible(record: &MeetingRecord) -> bool {
    record.has_address() || record.has_conference()
}

pub fn classify(record: &MeetingRecord) -> Classification {
    Classification {
        city: extract_city(record.address(), record.region_name()),
        category: attendance_category(record),
    }
}

/// City from the second-to-last address segment, then region, then [`UNKNOWN_CITY`].
///
/// The segment has `WA`/`Washington` stripped. Geocoded addresses end in
/// `"<city>, WA 98101, USA"`, where the second-to-last segment is only a postal
/// code once the state is gone; the segment before it is used then, as long as
/// it is not the street (first) segment.
pub fn extract_city(address: Option<&str>, region: Option<&str>) -> String {
    if let Some(addr) = address.filter(|a| !a.is_empty()) {
        let parts: Vec<&str> = addr.split(',').map(str::trim).collect();
        if parts.len() >= 2 {
            let mut idx = parts.len() - 2;
            let mut candidate = strip_state(parts[idx]);
            if is_postal_code(&candidate) && idx >= 2 {
                idx -= 1;
                candidate = strip_state(parts[idx]);
            }
            if !candidate.is_empty() && candidate != "USA" && !is_postal_code(&candidate) {
                return candidate;
            }
        }
    }
    match region.filter(|r| !r.is_empty()) {
        Some(r) => r.to_string(),
        None => UNKNOWN_CITY.to_string(),
    }
}

fn strip_state(segment: &str) -> String {
    segment
        .replace("WA", "")
        .replace("Washington", "")
        .trim()
        .to_string()
}

fn is_postal_code(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Explicit `attendance_option` wins verbatim; otherwise inferred, hybrid first.
pub fn attendance_category(record: &MeetingRecord) -> AttendanceCategory {
    if let Some(explicit) = record.explicit_attendance() {
        return AttendanceCategory::from_raw(explicit);
    }
    match (record.has_address(), record.has_conference()) {
        (true, true) => AttendanceCategory::Hybrid,
        (false, true) => AttendanceCategory::Online,
        (true, false) => AttendanceCategory::InPerson,
        (false, false) => AttendanceCategory::Other(String::new()),
    }
}
