// tests/organize_window.rs
use chrono::NaiveDate;
use serde_json::Value;
use tsml_meetings::classify::{extract_city, AttendanceCategory, UNKNOWN_CITY};
use tsml_meetings::ingest::decode_records;
use tsml_meetings::{organize, MeetingRecord};

const FIXTURE: &str = include_str!("fixtures/tsml_sample.json");

fn fixture_records() -> Vec<MeetingRecord> {
    let raw: Vec<Value> = serde_json::from_str(FIXTURE).unwrap();
    decode_records(&raw)
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

#[test]
fn stats_account_for_every_record() {
    let records = fixture_records();
    // The trailing `42` is not an object and never becomes a record.
    assert_eq!(records.len(), 7);

    let out = organize(&records, tuesday());
    let s = &out.stats;
    assert_eq!(s.total_processed, records.len());
    assert_eq!(s.skipped_incomplete, 1);
    assert_eq!(s.online_count, 2);
    assert_eq!(s.in_person_count, 2);
    assert_eq!(s.hybrid_count, 1);
    assert_eq!(s.included(), 5);
    // One eligible record has no day and is neither skipped nor included.
    assert_eq!(s.total_processed - s.skipped_incomplete - s.included(), 1);

    let cities: Vec<&str> = s.cities_found.iter().map(String::as_str).collect();
    assert_eq!(
        cities,
        vec!["Bellevue", "Kirkland", "Renton", "Seattle", UNKNOWN_CITY]
    );
}

#[test]
fn buckets_cover_the_window_in_order() {
    let out = organize(&fixture_records(), tuesday());
    let dates: Vec<NaiveDate> = out.buckets.keys().copied().collect();
    assert_eq!(dates.len(), 35);
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    // Tuesdays, Wednesdays and Sundays: five of each in the window.
    assert_eq!(out.days_with_meetings(), 15);
    for b in out.buckets.values() {
        assert_eq!(b.is_empty(), ![0, 2, 3].contains(&b.day_of_week));
    }
}

#[test]
fn tuesday_bucket_is_split_by_category_and_city() {
    let out = organize(&fixture_records(), tuesday());
    let b = &out.buckets[&tuesday()];
    assert_eq!(b.day_name, "Tuesday");
    assert_eq!(b.formatted_date, "October 20, 2026");
    assert_eq!(b.key(), "2026-10-20");

    let online: Vec<&str> = b.online.iter().map(|m| m.record.display_name()).collect();
    assert_eq!(online, vec!["Tuesday Night Online"]);
    assert_eq!(b.online[0].city, UNKNOWN_CITY);

    assert_eq!(b.in_person.keys().collect::<Vec<_>>(), vec!["Seattle"]);
    assert_eq!(b.in_person["Seattle"][0].record.display_name(), "Early Risers");
    assert_eq!(b.hybrid.keys().collect::<Vec<_>>(), vec!["Bellevue"]);
    assert_eq!(
        b.hybrid["Bellevue"][0].attendance_category,
        AttendanceCategory::Hybrid
    );
}

#[test]
fn explicit_attendance_option_wins_over_inference() {
    let wednesday = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
    let out = organize(&fixture_records(), tuesday());
    let b = &out.buckets[&wednesday];
    assert_eq!(b.online.len(), 1);
    assert_eq!(b.online[0].city, "Kirkland");
    assert!(b.hybrid.is_empty());
}

#[test]
fn meetings_in_a_group_are_sorted_by_time() {
    let mk = |time: &str, name: &str| MeetingRecord {
        name: Some(name.into()),
        day: Some(2),
        time: Some(time.into()),
        conference_url: Some("https://zoom.us/j/9".into()),
        ..Default::default()
    };
    let records = vec![mk("19:00", "late"), mk("07:00", "early"), mk("12:00", "noon")];
    let out = organize(&records, tuesday());
    let names: Vec<&str> = out.buckets[&tuesday()]
        .online
        .iter()
        .map(|m| m.record.display_name())
        .collect();
    assert_eq!(names, vec!["early", "noon", "late"]);
}

#[test]
fn organizing_is_deterministic() {
    let records = fixture_records();
    assert_eq!(organize(&records, tuesday()), organize(&records, tuesday()));
}

#[test]
fn empty_input_gives_empty_buckets() {
    let out = organize(&[], tuesday());
    assert_eq!(out.buckets.len(), 35);
    assert_eq!(out.days_with_meetings(), 0);
    assert_eq!(out.stats.total_processed, 0);
    assert!(out.stats.cities_found.is_empty());
}

#[test]
fn city_extraction_cases() {
    assert_eq!(
        extract_city(Some("123 Main St, Seattle, WA 98101, USA"), None),
        "Seattle"
    );
    assert_eq!(extract_city(Some("45 Oak Ave, Bellevue, WA"), None), "Bellevue");
    assert_eq!(extract_city(Some("Somewhere"), Some("Eastside")), "Eastside");
    // Two segments: the street is the second-to-last one and is kept as-is.
    assert_eq!(extract_city(Some("1 A St, USA"), None), "1 A St");
    assert_eq!(extract_city(Some("Main St, USA, Earth"), Some("Eastside")), "Eastside");
    assert_eq!(extract_city(Some("Main St, USA, Earth"), None), UNKNOWN_CITY);
    assert_eq!(extract_city(None, None), UNKNOWN_CITY);
}
