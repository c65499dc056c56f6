//! Booking policy evaluator: the global constraints checked, in order,
//! before a candidate reservation reaches the availability engine, plus
//! the cancellation lockout rule.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::error::BookingError;
use super::time::{is_within_24_hours, parse_local_date, time_to_minutes};
use crate::models::{Reservation, ReservationStatus, Space, SystemSettings};

/// Inactive spaces cannot receive new reservations.
pub fn check_space_bookable(space: &Space) -> Result<(), BookingError> {
    if !space.is_active {
        return Err(BookingError::SpaceInactive);
    }
    Ok(())
}

/// The candidate interval must lie inside the space's daily operating
/// hours.
pub fn check_operating_hours(space: &Space, start: u32, end: u32) -> Result<(), BookingError> {
    let (opens, closes) = match (
        time_to_minutes(&space.operating_hours.start),
        time_to_minutes(&space.operating_hours.end),
    ) {
        (Some(opens), Some(closes)) => (opens, closes),
        // A space with unparsable hours cannot be booked against them
        _ => return Err(BookingError::OutsideOperatingHours),
    };
    if start < opens || end > closes {
        return Err(BookingError::OutsideOperatingHours);
    }
    Ok(())
}

/// Past-date and advance-window checks. Same-day bookings are allowed;
/// intraday elapsed time is not re-checked at creation.
pub fn check_booking_window(
    date: NaiveDate,
    today: NaiveDate,
    settings: &SystemSettings,
) -> Result<(), BookingError> {
    if date < today {
        return Err(BookingError::PastDate);
    }
    if let Some(max_days) = settings.max_advance_days {
        if date > today + Duration::days(i64::from(max_days)) {
            return Err(BookingError::AdvanceWindowExceeded);
        }
    }
    Ok(())
}

/// Per-user cap on concurrent active reservations. `active_count` is
/// the user's non-cancelled, today-or-future reservation count.
pub fn check_concurrency_cap(
    active_count: u32,
    settings: &SystemSettings,
) -> Result<(), BookingError> {
    if let Some(cap) = settings.max_concurrent_reservations {
        if active_count >= cap {
            return Err(BookingError::ConcurrencyCapExceeded);
        }
    }
    Ok(())
}

/// Cancellation lockout: already cancelled or completed reservations
/// cannot be cancelled, and neither can one starting within the next
/// 24 hours. Exactly 24 hours before the start still cancels.
pub fn can_cancel(reservation: &Reservation, now: NaiveDateTime) -> bool {
    if reservation.status == ReservationStatus::Cancelled {
        return false;
    }
    if let Some(end) = reservation.end_instant() {
        if now >= end {
            return false;
        }
    }
    let Some(date) = parse_local_date(&reservation.date) else {
        return false;
    };
    !is_within_24_hours(date, &reservation.start_time, now)
}
