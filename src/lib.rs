// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod calendar;
pub mod classify;
pub mod config;
pub mod export;
pub mod ingest;
pub mod meeting;
pub mod metrics;
pub mod organize;
pub mod pipeline;
pub mod render;
pub mod sink;
pub mod sitemap;

// ---- Re-exports for the core transform ----
pub use crate::calendar::{organize_by_calendar_day, CalendarInfo};
pub use crate::classify::{classify, AttendanceCategory, Classification};
pub use crate::meeting::MeetingRecord;
pub use crate::organize::{organize, DateBucket, Organized, ProcessStats};
