//! Local-calendar date and wall-clock helpers.
//!
//! Dates are `NaiveDate` and times are `HH:MM` strings converted to
//! minutes since midnight, so none of this drifts with the machine
//! timezone: the same `YYYY-MM-DD` input yields the same calendar date
//! everywhere.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};

/// Parse a strict `YYYY-MM-DD` string as a local calendar date; any
/// other shape falls back to RFC 3339 and takes the local calendar day.
pub fn parse_local_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    // chrono accepts unpadded numerics, so the 10-char shape is
    // enforced here to keep "2024-6-1" out of the strict path
    if trimmed.len() == 10 && trimmed.as_bytes()[4] == b'-' && trimmed.as_bytes()[7] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// `"HH:MM"` to minutes since midnight.
pub fn time_to_minutes(time: &str) -> Option<u32> {
    let (hours, minutes) = time.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Zero-padded inverse of [`time_to_minutes`].
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Current local calendar date.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local calendar date as `YYYY-MM-DD`, the minimum selectable
/// date for new reservations.
pub fn today_local_iso() -> String {
    today_local().format("%Y-%m-%d").to_string()
}

/// Current local wall-clock instant, the "now" snapshot taken once per
/// request at the server edge.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

pub fn is_tomorrow(date: NaiveDate, today: NaiveDate) -> bool {
    date == today + Duration::days(1)
}

/// Combine a calendar date with an `HH:MM` wall-clock time.
pub fn slot_instant(date: NaiveDate, time: &str) -> Option<NaiveDateTime> {
    let minutes = time_to_minutes(time)?;
    date.and_hms_opt(minutes / 60, minutes % 60, 0)
}

/// True iff the slot's start instant is strictly between `now` and
/// `now + 24h`. Exactly 24 hours before the start is *not* within the
/// window, so cancellation at that boundary is still allowed.
pub fn is_within_24_hours(date: NaiveDate, start_time: &str, now: NaiveDateTime) -> bool {
    let Some(start) = slot_instant(date, start_time) else {
        return false;
    };
    start > now && start < now + Duration::hours(24)
}
