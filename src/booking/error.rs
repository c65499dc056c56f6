use thiserror::Error;

/// Rejection taxonomy for booking operations.
///
/// These are expected, user-facing conditions returned as typed values
/// so callers can render them directly; storage failures travel on a
/// separate channel and are never conflated with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("end time must be after start time")]
    InvalidInterval,
    #[error("date must be a valid YYYY-MM-DD calendar date")]
    InvalidDate,
    #[error("reservations must be at least 1 hour long")]
    DurationTooShort,
    #[error("reservations cannot exceed 4 hours")]
    DurationTooLong,
    #[error("this space is not currently accepting reservations")]
    SpaceInactive,
    #[error("the requested slot is outside the space's operating hours")]
    OutsideOperatingHours,
    #[error("reservations cannot be made for past dates")]
    PastDate,
    #[error("the requested date is beyond the advance booking window")]
    AdvanceWindowExceeded,
    #[error("you already hold the maximum number of active reservations")]
    ConcurrencyCapExceeded,
    #[error("the requested time slot is not available")]
    SlotUnavailable,
    #[error("reservation not found")]
    NotFound,
    #[error("this reservation can no longer be cancelled")]
    CancellationLockedOut,
}

impl BookingError {
    /// Stable machine-readable tag for API responses.
    pub fn reason(&self) -> &'static str {
        match self {
            BookingError::InvalidInterval => "invalid_interval",
            BookingError::InvalidDate => "invalid_date",
            BookingError::DurationTooShort => "duration_too_short",
            BookingError::DurationTooLong => "duration_too_long",
            BookingError::SpaceInactive => "space_inactive",
            BookingError::OutsideOperatingHours => "outside_operating_hours",
            BookingError::PastDate => "past_date",
            BookingError::AdvanceWindowExceeded => "advance_window_exceeded",
            BookingError::ConcurrencyCapExceeded => "concurrency_cap_exceeded",
            BookingError::SlotUnavailable => "slot_unavailable",
            BookingError::NotFound => "not_found",
            BookingError::CancellationLockedOut => "cancellation_locked_out",
        }
    }
}
