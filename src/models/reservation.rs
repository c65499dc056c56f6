use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::booking::time::{is_today, is_tomorrow, parse_local_date, slot_instant};

/// Persisted reservation status. Only these two values are ever stored;
/// the finer-grained labels are derived at read time (see
/// [`Reservation::display_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Presentation-time status label derived from the current time versus
/// the reservation interval; never written back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Confirmed,
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

/// A reservation for a space on a single calendar date.
///
/// `space_name`, `user_name` and `user_contact` are denormalized copies
/// taken at creation time, so historical rows keep their display text
/// even if the source space or user record changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub space_id: String,
    pub space_name: String,
    pub user_id: String,
    pub user_name: String,
    pub user_contact: String,
    /// Calendar date, `YYYY-MM-DD`, timezone-naive local
    pub date: String,
    /// Wall-clock start, `HH:MM`
    pub start_time: String,
    /// Wall-clock end, `HH:MM`, exclusive
    pub end_time: String,
    /// Free-text event/purpose label
    pub event: String,
    pub status: ReservationStatus,
    pub created_at: String,
}

impl Reservation {
    /// Local start instant of the slot, if the stored date/time parse.
    pub fn start_instant(&self) -> Option<NaiveDateTime> {
        slot_instant(parse_local_date(&self.date)?, &self.start_time)
    }

    /// Local end instant of the slot, if the stored date/time parse.
    pub fn end_instant(&self) -> Option<NaiveDateTime> {
        slot_instant(parse_local_date(&self.date)?, &self.end_time)
    }

    /// Derive the presentation label for `now`.
    pub fn display_status(&self, now: NaiveDateTime) -> DisplayStatus {
        if self.status == ReservationStatus::Cancelled {
            return DisplayStatus::Cancelled;
        }
        match (self.start_instant(), self.end_instant()) {
            (Some(start), Some(end)) => {
                if now >= end {
                    DisplayStatus::Completed
                } else if now >= start {
                    DisplayStatus::InProgress
                } else if is_today(start.date(), now.date()) || is_tomorrow(start.date(), now.date())
                {
                    DisplayStatus::Upcoming
                } else {
                    DisplayStatus::Confirmed
                }
            }
            _ => DisplayStatus::Confirmed,
        }
    }

    /// API view of the reservation with the derived label attached.
    pub fn into_view(self, now: NaiveDateTime) -> ReservationView {
        let display_status = self.display_status(now);
        ReservationView {
            reservation: self,
            display_status,
        }
    }
}

/// Reservation as returned by the API: the persisted record plus the
/// time-derived `display_status`.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub display_status: DisplayStatus,
}

/// Request to create a reservation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub space_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub event: String,
}
