//! Reservation lifecycle manager: orchestrates the policy chain, the
//! availability pre-check, and persistence.

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use super::availability::{is_slot_available, validate_interval};
use super::error::BookingError;
use super::policy::{
    can_cancel, check_booking_window, check_concurrency_cap, check_operating_hours,
    check_space_bookable,
};
use super::time::{parse_local_date, time_to_minutes};
use crate::db::Database;
use crate::models::{CreateReservationRequest, Reservation, ReservationStatus, User};

#[derive(Debug, Error)]
pub enum ManagerError {
    /// Expected, user-facing policy rejection
    #[error(transparent)]
    Rejected(#[from] BookingError),
    /// Storage failure; surfaced to callers as a generic retryable error
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct ReservationManager {
    db: Database,
}

impl ReservationManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a reservation: run the full policy chain, pre-check the
    /// slot, then persist with a transactional overlap re-check. On any
    /// rejection nothing is written.
    ///
    /// `now` is sampled once by the caller so every check in one call
    /// observes the same clock; the settings snapshot is read once here
    /// for the same reason.
    pub fn create(
        &self,
        user: &User,
        request: &CreateReservationRequest,
        now: NaiveDateTime,
    ) -> Result<Reservation, ManagerError> {
        let date = parse_local_date(&request.date).ok_or(BookingError::InvalidDate)?;
        let date_iso = date.format("%Y-%m-%d").to_string();

        let start = time_to_minutes(&request.start_time).ok_or(BookingError::InvalidInterval)?;
        let end = time_to_minutes(&request.end_time).ok_or(BookingError::InvalidInterval)?;
        validate_interval(start, end)?;

        let space = self
            .db
            .get_space(&request.space_id)?
            .ok_or(BookingError::NotFound)?;
        check_space_bookable(&space)?;
        check_operating_hours(&space, start, end)?;

        let today = now.date();
        let settings = self.db.get_settings()?;
        check_booking_window(date, today, &settings)?;

        let active = self
            .db
            .count_active_reservations(&user.id, &today.format("%Y-%m-%d").to_string())?;
        check_concurrency_cap(active, &settings)?;

        let schedule = self.db.schedule_for_space(&space.id, &date_iso)?;
        if !is_slot_available(&schedule, start, end) {
            return Err(BookingError::SlotUnavailable.into());
        }

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            space_id: space.id.clone(),
            space_name: space.name.clone(),
            user_id: user.id.clone(),
            user_name: user.full_name.clone(),
            user_contact: user.phone.clone(),
            date: date_iso,
            start_time: request.start_time.trim().to_string(),
            end_time: request.end_time.trim().to_string(),
            event: request.event.clone(),
            status: ReservationStatus::Confirmed,
            created_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };

        // The pre-check above can race another create; the insert
        // re-checks under the connection lock and is authoritative.
        if !self.db.create_reservation(&reservation, start, end)? {
            return Err(BookingError::SlotUnavailable.into());
        }

        tracing::info!(
            reservation = %reservation.id,
            space = %reservation.space_id,
            date = %reservation.date,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Cancel a reservation: unknown id is `NotFound`; inside the 24h
    /// lockout window, already cancelled, or already completed is
    /// `CancellationLockedOut`. The row is marked, never deleted.
    pub fn cancel(&self, id: &str, now: NaiveDateTime) -> Result<(), ManagerError> {
        let reservation = self.db.get_reservation(id)?.ok_or(BookingError::NotFound)?;
        if !can_cancel(&reservation, now) {
            return Err(BookingError::CancellationLockedOut.into());
        }
        self.db.cancel_reservation(id)?;
        tracing::info!(reservation = %id, "reservation cancelled");
        Ok(())
    }

    /// A user's active reservations, most recently created first
    pub fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>, ManagerError> {
        Ok(self.db.reservations_for_user(user_id)?)
    }

    /// Non-cancelled reservations for a space on a date, ascending by
    /// start time
    pub fn schedule_for_space(
        &self,
        space_id: &str,
        date: &str,
    ) -> Result<Vec<Reservation>, ManagerError> {
        let date = parse_local_date(date).ok_or(BookingError::InvalidDate)?;
        Ok(self
            .db
            .schedule_for_space(space_id, &date.format("%Y-%m-%d").to_string())?)
    }

    /// Pre-submit availability hint for the booking UI. Interval and
    /// duration problems report as unavailable rather than erroring.
    pub fn is_slot_available(
        &self,
        space_id: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<bool, ManagerError> {
        let date = parse_local_date(date).ok_or(BookingError::InvalidDate)?;
        let (Some(start), Some(end)) = (time_to_minutes(start_time), time_to_minutes(end_time))
        else {
            return Ok(false);
        };
        if start >= end {
            return Ok(false);
        }
        let schedule = self
            .db
            .schedule_for_space(space_id, &date.format("%Y-%m-%d").to_string())?;
        Ok(is_slot_available(&schedule, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperatingHours, Role, Space, SpaceCategory, SystemSettings};
    use chrono::NaiveDate;

    fn setup() -> (Database, ReservationManager, User, Space) {
        let db = Database::open_in_memory().unwrap();
        let manager = ReservationManager::new(db.clone());

        let user = User {
            id: "user-1".to_string(),
            email: "ada@example.com".to_string(),
            identification_number: "1001".to_string(),
            full_name: "Ada Lovelace".to_string(),
            phone: "+1 555 0100".to_string(),
            role: Role::User,
            password_hash: "x".to_string(),
            api_key_hash: "x".to_string(),
            is_active: true,
            created_at: "2024-05-01T09:00:00".to_string(),
        };
        db.create_user(&user).unwrap();

        let space = Space {
            id: "space-1".to_string(),
            name: "Space S".to_string(),
            category: SpaceCategory::Social,
            capacity: 50,
            description: String::new(),
            operating_hours: OperatingHours {
                start: "08:00".to_string(),
                end: "18:00".to_string(),
            },
            rules: vec![],
            is_active: true,
            image_url: None,
        };
        db.create_space(&space).unwrap();

        (db, manager, user, space)
    }

    fn request(space_id: &str, date: &str, start: &str, end: &str) -> CreateReservationRequest {
        CreateReservationRequest {
            space_id: space_id.to_string(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            event: "Family gathering".to_string(),
        }
    }

    fn now(date: &str, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn rejection(result: Result<Reservation, ManagerError>) -> BookingError {
        match result {
            Err(ManagerError::Rejected(e)) => e,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn accepted_then_overlap_then_touching() {
        let (_db, manager, user, space) = setup();
        let at = now("2024-05-20", 9, 0);

        // Scenario A: empty schedule, [10:00,11:30) accepted
        let first = manager
            .create(&user, &request(&space.id, "2024-06-01", "10:00", "11:30"), at)
            .unwrap();
        assert_eq!(first.status, ReservationStatus::Confirmed);
        assert_eq!(first.space_name, "Space S");
        assert_eq!(first.user_name, "Ada Lovelace");

        // Scenario B: [11:00,12:00) overlaps and is rejected
        let result = manager.create(
            &user,
            &request(&space.id, "2024-06-01", "11:00", "12:00"),
            at,
        );
        assert_eq!(rejection(result), BookingError::SlotUnavailable);

        // Scenario C: [11:30,12:30) touches and is accepted
        manager
            .create(&user, &request(&space.id, "2024-06-01", "11:30", "12:30"), at)
            .unwrap();

        let schedule = manager.schedule_for_space(&space.id, "2024-06-01").unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].start_time, "10:00");
        assert_eq!(schedule[1].start_time, "11:30");
    }

    #[test]
    fn duration_and_interval_rejections() {
        let (_db, manager, user, space) = setup();
        let at = now("2024-05-20", 9, 0);

        let r = manager.create(&user, &request(&space.id, "2024-06-01", "10:00", "10:59"), at);
        assert_eq!(rejection(r), BookingError::DurationTooShort);

        let r = manager.create(&user, &request(&space.id, "2024-06-01", "10:00", "14:01"), at);
        assert_eq!(rejection(r), BookingError::DurationTooLong);

        let r = manager.create(&user, &request(&space.id, "2024-06-01", "11:00", "10:00"), at);
        assert_eq!(rejection(r), BookingError::InvalidInterval);

        let r = manager.create(&user, &request(&space.id, "junk", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::InvalidDate);

        // 61 minutes, in hours, no conflicts: accepted
        manager
            .create(&user, &request(&space.id, "2024-06-01", "10:00", "11:01"), at)
            .unwrap();
    }

    #[test]
    fn policy_rejections() {
        let (db, manager, user, space) = setup();
        let at = now("2024-06-15", 9, 0);

        let r = manager.create(&user, &request(&space.id, "2024-06-14", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::PastDate);

        // maxAdvanceDays = 30: today + 31 rejected, today + 30 accepted
        let r = manager.create(&user, &request(&space.id, "2024-07-16", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::AdvanceWindowExceeded);
        manager
            .create(&user, &request(&space.id, "2024-07-15", "10:00", "11:00"), at)
            .unwrap();

        // outside operating hours (08:00-18:00)
        let r = manager.create(&user, &request(&space.id, "2024-06-20", "07:00", "09:00"), at);
        assert_eq!(rejection(r), BookingError::OutsideOperatingHours);

        // inactive space
        let mut inactive = space.clone();
        inactive.is_active = false;
        db.update_space(&inactive).unwrap();
        let r = manager.create(&user, &request(&space.id, "2024-06-20", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::SpaceInactive);

        // unknown space
        let r = manager.create(&user, &request("missing", "2024-06-20", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::NotFound);
    }

    #[test]
    fn concurrency_cap_applies_regardless_of_slot() {
        let (_db, manager, user, space) = setup();
        let at = now("2024-06-01", 9, 0);

        for day in ["2024-06-10", "2024-06-11", "2024-06-12"] {
            manager
                .create(&user, &request(&space.id, day, "10:00", "11:00"), at)
                .unwrap();
        }

        // 4th attempt rejected even though the slot itself is free
        let r = manager.create(&user, &request(&space.id, "2024-06-13", "10:00", "11:00"), at);
        assert_eq!(rejection(r), BookingError::ConcurrencyCapExceeded);

        // cancelling one frees a slot under the cap
        let mine = manager.reservations_for_user(&user.id).unwrap();
        manager.cancel(&mine[0].id, at).unwrap();
        manager
            .create(&user, &request(&space.id, "2024-06-13", "10:00", "11:00"), at)
            .unwrap();
    }

    #[test]
    fn cancellation_lifecycle() {
        let (_db, manager, user, space) = setup();
        let at = now("2024-06-01", 9, 0);

        let reservation = manager
            .create(&user, &request(&space.id, "2024-06-10", "10:00", "11:00"), at)
            .unwrap();

        // unknown id
        match manager.cancel("missing", at) {
            Err(ManagerError::Rejected(BookingError::NotFound)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }

        // inside the 24h lockout
        let close = now("2024-06-09", 12, 0);
        match manager.cancel(&reservation.id, close) {
            Err(ManagerError::Rejected(BookingError::CancellationLockedOut)) => {}
            other => panic!("expected lockout, got {:?}", other),
        }

        // outside the window it cancels
        manager.cancel(&reservation.id, at).unwrap();
        assert!(manager.reservations_for_user(&user.id).unwrap().is_empty());

        // cancelling again is rejected, not idempotent
        match manager.cancel(&reservation.id, at) {
            Err(ManagerError::Rejected(BookingError::CancellationLockedOut)) => {}
            other => panic!("expected lockout, got {:?}", other),
        }
    }

    #[test]
    fn availability_hint() {
        let (_db, manager, user, space) = setup();
        let at = now("2024-05-20", 9, 0);
        manager
            .create(&user, &request(&space.id, "2024-06-01", "10:00", "11:30"), at)
            .unwrap();

        assert!(!manager
            .is_slot_available(&space.id, "2024-06-01", "11:00", "12:00")
            .unwrap());
        assert!(manager
            .is_slot_available(&space.id, "2024-06-01", "11:30", "12:30")
            .unwrap());
        assert!(!manager
            .is_slot_available(&space.id, "2024-06-01", "12:00", "12:00")
            .unwrap());
    }

    #[test]
    fn unbounded_settings_lift_the_caps() {
        let (db, manager, user, space) = setup();
        let at = now("2024-06-01", 9, 0);

        db.update_settings(&SystemSettings {
            max_advance_days: None,
            max_concurrent_reservations: None,
            internal_message: String::new(),
        })
        .unwrap();

        for (i, day) in ["2024-06-10", "2024-06-11", "2024-06-12", "2024-06-13"]
            .iter()
            .enumerate()
        {
            let r = manager
                .create(&user, &request(&space.id, day, "10:00", "11:00"), at)
                .unwrap();
            assert_eq!(r.date, *day, "reservation {} failed", i);
        }

        // far-future booking allowed with no advance window
        manager
            .create(&user, &request(&space.id, "2030-01-01", "10:00", "11:00"), at)
            .unwrap();
    }
}
