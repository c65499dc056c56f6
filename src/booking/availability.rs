//! Slot availability engine: half-open interval overlap against the
//! non-cancelled reservations already on file for one space and date.

use super::error::BookingError;
use super::time::time_to_minutes;
use crate::models::{Reservation, ReservationStatus};

/// Minimum reservation length, minutes
pub const MIN_DURATION_MINUTES: u32 = 60;
/// Maximum reservation length, minutes (4 hours)
pub const MAX_DURATION_MINUTES: u32 = 240;

/// Half-open overlap: `[a_start, a_end)` conflicts with
/// `[b_start, b_end)` iff `a_start < b_end && b_start < a_end`.
/// Touching edges are not a conflict.
pub fn conflicts(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Validate a candidate interval against the duration policy. Runs
/// before the overlap scan.
pub fn validate_interval(start: u32, end: u32) -> Result<(), BookingError> {
    if start >= end {
        return Err(BookingError::InvalidInterval);
    }
    let duration = end - start;
    if duration < MIN_DURATION_MINUTES {
        return Err(BookingError::DurationTooShort);
    }
    if duration > MAX_DURATION_MINUTES {
        return Err(BookingError::DurationTooLong);
    }
    Ok(())
}

/// True iff no existing non-cancelled reservation conflicts with the
/// candidate `[start, end)` interval.
///
/// `existing` must already be filtered to the same space and date; the
/// status filter is re-applied here so a caller passing a raw schedule
/// still gets the right answer. This is a fast pre-check: the
/// authoritative guard is the transactional re-check at insert time.
pub fn is_slot_available(existing: &[Reservation], start: u32, end: u32) -> bool {
    !existing.iter().any(|reservation| {
        if reservation.status == ReservationStatus::Cancelled {
            return false;
        }
        match (
            time_to_minutes(&reservation.start_time),
            time_to_minutes(&reservation.end_time),
        ) {
            (Some(existing_start), Some(existing_end)) => {
                conflicts(start, end, existing_start, existing_end)
            }
            _ => false,
        }
    })
}
