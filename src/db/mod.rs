use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::models::{
    OperatingHours, Reservation, ReservationStatus, Role, Space, SpaceCategory, SystemSettings,
    User,
};

const MIGRATION_001: &str = include_str!("migrations/001_initial.sql");

/// Database connection wrapper.
///
/// A single connection behind a mutex: the lock is also the
/// serialization point for check-then-insert on reservations, so two
/// racing create calls for overlapping slots cannot both commit.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(MIGRATION_001)
            .context("Failed to run migration 001")?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Create a new user
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO users (id, email, identification_number, full_name, phone, role,
                               password_hash, api_key_hash, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                user.id,
                user.email,
                user.identification_number,
                user.full_name,
                user.phone,
                user.role.as_str(),
                user.password_hash,
                user.api_key_hash,
                user.is_active,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))?;
        stmt.query_row(params![id], map_user)
            .optional()
            .context("Failed to get user")
    }

    /// Get a user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))?;
        stmt.query_row(params![email], map_user)
            .optional()
            .context("Failed to get user by email")
    }

    /// List all users (admin view)
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))?;
        let users = stmt.query_map([], map_user)?;
        users
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list users")
    }

    /// Find user by validating an API key against stored hashes.
    /// Deactivated accounts never match.
    pub fn find_user_by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = 1"
        ))?;
        let users = stmt.query_map([], map_user)?;

        for user_result in users {
            let user = user_result?;
            if bcrypt::verify(api_key, &user.api_key_hash).unwrap_or(false) {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }

    /// Update a user's API key hash
    pub fn update_user_api_key_hash(&self, user_id: &str, api_key_hash: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET api_key_hash = ?1 WHERE id = ?2",
            params![api_key_hash, user_id],
        )?;
        Ok(())
    }

    /// Activate or deactivate a user
    pub fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET is_active = ?1 WHERE id = ?2",
            params![is_active, user_id],
        )?;
        Ok(())
    }

    /// Change a user's role
    pub fn set_user_role(&self, user_id: &str, role: Role) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            params![role.as_str(), user_id],
        )?;
        Ok(())
    }

    // ==================== Space Operations ====================

    /// Create a new space
    pub fn create_space(&self, space: &Space) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO spaces (id, name, category, capacity, description, opens_at, closes_at,
                                rules, is_active, image_url)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                space.id,
                space.name,
                space.category.as_str(),
                space.capacity,
                space.description,
                space.operating_hours.start,
                space.operating_hours.end,
                serde_json::to_string(&space.rules)?,
                space.is_active,
                space.image_url,
            ],
        )?;
        Ok(())
    }

    /// Get a space by ID
    pub fn get_space(&self, id: &str) -> Result<Option<Space>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SPACE_COLUMNS} FROM spaces WHERE id = ?1"
        ))?;
        stmt.query_row(params![id], map_space)
            .optional()
            .context("Failed to get space")
    }

    /// List all spaces
    pub fn list_spaces(&self) -> Result<Vec<Space>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SPACE_COLUMNS} FROM spaces ORDER BY name ASC"
        ))?;
        let spaces = stmt.query_map([], map_space)?;
        spaces
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list spaces")
    }

    /// Overwrite a space record
    pub fn update_space(&self, space: &Space) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE spaces SET name = ?2, category = ?3, capacity = ?4, description = ?5,
                              opens_at = ?6, closes_at = ?7, rules = ?8, is_active = ?9,
                              image_url = ?10
            WHERE id = ?1
            "#,
            params![
                space.id,
                space.name,
                space.category.as_str(),
                space.capacity,
                space.description,
                space.operating_hours.start,
                space.operating_hours.end,
                serde_json::to_string(&space.rules)?,
                space.is_active,
                space.image_url,
            ],
        )?;
        Ok(())
    }

    /// Delete a space. Reservations keep their denormalized space name.
    pub fn delete_space(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute("DELETE FROM spaces WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    // ==================== Reservation Operations ====================

    /// Insert a reservation, re-checking the overlap invariant inside a
    /// transaction. Returns `false` (and inserts nothing) if a
    /// conflicting non-cancelled reservation for the same space and
    /// date was committed since the caller's availability pre-check.
    pub fn create_reservation(&self, reservation: &Reservation, start: u32, end: u32) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let conflicts: i64 = tx.query_row(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE space_id = ?1 AND date = ?2 AND status != 'cancelled'
              AND start_minutes < ?4 AND ?3 < end_minutes
            "#,
            params![reservation.space_id, reservation.date, start, end],
            |row| row.get(0),
        )?;
        if conflicts > 0 {
            return Ok(false);
        }

        tx.execute(
            r#"
            INSERT INTO reservations (id, space_id, space_name, user_id, user_name, user_contact,
                                      date, start_time, end_time, start_minutes, end_minutes,
                                      event, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                reservation.id,
                reservation.space_id,
                reservation.space_name,
                reservation.user_id,
                reservation.user_name,
                reservation.user_contact,
                reservation.date,
                reservation.start_time,
                reservation.end_time,
                start,
                end,
                reservation.event,
                reservation.status.as_str(),
                reservation.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Get a reservation by ID
    pub fn get_reservation(&self, id: &str) -> Result<Option<Reservation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1"
        ))?;
        stmt.query_row(params![id], map_reservation)
            .optional()
            .context("Failed to get reservation")
    }

    /// Flip a reservation's status to cancelled. The row is never
    /// deleted; the audit trail is preserved.
    pub fn cancel_reservation(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE reservations SET status = 'cancelled' WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    /// A user's non-cancelled reservations, most recently created first
    pub fn reservations_for_user(&self, user_id: &str) -> Result<Vec<Reservation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE user_id = ?1 AND status != 'cancelled'
             ORDER BY created_at DESC"
        ))?;
        let reservations = stmt.query_map(params![user_id], map_reservation)?;
        reservations
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to get reservations for user")
    }

    /// Non-cancelled reservations for a space on a date, ascending by
    /// start time. This is the feed the availability engine consumes.
    pub fn schedule_for_space(&self, space_id: &str, date: &str) -> Result<Vec<Reservation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE space_id = ?1 AND date = ?2 AND status != 'cancelled'
             ORDER BY start_minutes ASC"
        ))?;
        let reservations = stmt.query_map(params![space_id, date], map_reservation)?;
        reservations
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to get space schedule")
    }

    /// All reservations in the system, newest first (admin view)
    pub fn all_reservations(&self) -> Result<Vec<Reservation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY created_at DESC"
        ))?;
        let reservations = stmt.query_map([], map_reservation)?;
        reservations
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list reservations")
    }

    /// Count a user's active reservations: non-cancelled with a date of
    /// today or later. Feeds the concurrency cap check.
    pub fn count_active_reservations(&self, user_id: &str, today: &str) -> Result<u32> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reservations
             WHERE user_id = ?1 AND status != 'cancelled' AND date >= ?2",
            params![user_id, today],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    // ==================== Settings Operations ====================

    /// Read the settings singleton
    pub fn get_settings(&self) -> Result<SystemSettings> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT max_advance_days, max_concurrent_reservations, internal_message
             FROM settings WHERE id = 1",
            [],
            |row| {
                Ok(SystemSettings {
                    max_advance_days: row.get(0)?,
                    max_concurrent_reservations: row.get(1)?,
                    internal_message: row.get(2)?,
                })
            },
        )
        .context("Failed to get settings")
    }

    /// Overwrite the settings singleton
    pub fn update_settings(&self, settings: &SystemSettings) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE settings SET max_advance_days = ?1, max_concurrent_reservations = ?2,
                                 internal_message = ?3
             WHERE id = 1",
            params![
                settings.max_advance_days,
                settings.max_concurrent_reservations,
                settings.internal_message,
            ],
        )?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, email, identification_number, full_name, phone, role, \
                            password_hash, api_key_hash, is_active, created_at";

const SPACE_COLUMNS: &str =
    "id, name, category, capacity, description, opens_at, closes_at, rules, is_active, image_url";

const RESERVATION_COLUMNS: &str = "id, space_id, space_name, user_id, user_name, user_contact, \
                                   date, start_time, end_time, event, status, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        identification_number: row.get(2)?,
        full_name: row.get(3)?,
        phone: row.get(4)?,
        role: Role::parse(&row.get::<_, String>(5)?).unwrap_or_default(),
        password_hash: row.get(6)?,
        api_key_hash: row.get(7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_space(row: &Row<'_>) -> rusqlite::Result<Space> {
    let rules: String = row.get(7)?;
    Ok(Space {
        id: row.get(0)?,
        name: row.get(1)?,
        category: SpaceCategory::parse(&row.get::<_, String>(2)?)
            .unwrap_or(SpaceCategory::Hall),
        capacity: row.get(3)?,
        description: row.get(4)?,
        operating_hours: OperatingHours {
            start: row.get(5)?,
            end: row.get(6)?,
        },
        rules: serde_json::from_str(&rules).unwrap_or_default(),
        is_active: row.get(8)?,
        image_url: row.get(9)?,
    })
}

fn map_reservation(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get(0)?,
        space_id: row.get(1)?,
        space_name: row.get(2)?,
        user_id: row.get(3)?,
        user_name: row.get(4)?,
        user_contact: row.get(5)?,
        date: row.get(6)?,
        start_time: row.get(7)?,
        end_time: row.get(8)?,
        event: row.get(9)?,
        status: ReservationStatus::parse(&row.get::<_, String>(10)?).unwrap_or_default(),
        created_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(email: &str) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            identification_number: "1001".to_string(),
            full_name: "Test User".to_string(),
            phone: "+1 555 0100".to_string(),
            role: Role::User,
            password_hash: bcrypt::hash("secret", 4).unwrap(),
            api_key_hash: bcrypt::hash("test_api_key", 4).unwrap(),
            is_active: true,
            created_at: "2024-05-01T09:00:00".to_string(),
        }
    }

    fn test_space(name: &str) -> Space {
        Space {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: SpaceCategory::Sport,
            capacity: 22,
            description: "Synthetic turf field".to_string(),
            operating_hours: OperatingHours {
                start: "08:00".to_string(),
                end: "18:00".to_string(),
            },
            rules: vec!["Wear proper footwear".to_string()],
            is_active: true,
            image_url: None,
        }
    }

    fn test_reservation(
        space: &Space,
        user: &User,
        date: &str,
        start: &str,
        end: &str,
        created_at: &str,
    ) -> Reservation {
        Reservation {
            id: uuid::Uuid::new_v4().to_string(),
            space_id: space.id.clone(),
            space_name: space.name.clone(),
            user_id: user.id.clone(),
            user_name: user.full_name.clone(),
            user_contact: user.phone.clone(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            event: "Practice".to_string(),
            status: ReservationStatus::Confirmed,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let db = Database::open_in_memory().unwrap();
        let user = test_user("ada@example.com");

        db.create_user(&user).unwrap();

        let retrieved = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(retrieved.email, user.email);
        assert_eq!(retrieved.role, Role::User);
    }

    #[test]
    fn test_find_user_by_api_key_skips_inactive() {
        let db = Database::open_in_memory().unwrap();
        let user = test_user("ada@example.com");
        db.create_user(&user).unwrap();

        let found = db.find_user_by_api_key("test_api_key").unwrap();
        assert_eq!(found.unwrap().id, user.id);

        assert!(db.find_user_by_api_key("wrong_key").unwrap().is_none());

        db.set_user_active(&user.id, false).unwrap();
        assert!(db.find_user_by_api_key("test_api_key").unwrap().is_none());
    }

    #[test]
    fn test_space_round_trip_and_update() {
        let db = Database::open_in_memory().unwrap();
        let mut space = test_space("Main Field");
        db.create_space(&space).unwrap();

        let retrieved = db.get_space(&space.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Main Field");
        assert_eq!(retrieved.rules, vec!["Wear proper footwear".to_string()]);

        space.is_active = false;
        space.capacity = 11;
        db.update_space(&space).unwrap();
        let retrieved = db.get_space(&space.id).unwrap().unwrap();
        assert!(!retrieved.is_active);
        assert_eq!(retrieved.capacity, 11);

        assert!(db.delete_space(&space.id).unwrap());
        assert!(db.get_space(&space.id).unwrap().is_none());
        assert!(!db.delete_space(&space.id).unwrap());
    }

    #[test]
    fn test_insert_rejects_overlap_at_commit_time() {
        let db = Database::open_in_memory().unwrap();
        let space = test_space("Main Field");
        let user = test_user("ada@example.com");
        db.create_space(&space).unwrap();
        db.create_user(&user).unwrap();

        let first = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "10:00",
            "11:30",
            "2024-05-01T09:00:00",
        );
        assert!(db.create_reservation(&first, 600, 690).unwrap());

        // Overlapping insert is refused even without a prior pre-check
        let overlapping = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "11:00",
            "12:00",
            "2024-05-01T09:01:00",
        );
        assert!(!db.create_reservation(&overlapping, 660, 720).unwrap());
        assert!(db.get_reservation(&overlapping.id).unwrap().is_none());

        // Touching slot commits
        let touching = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "11:30",
            "12:30",
            "2024-05-01T09:02:00",
        );
        assert!(db.create_reservation(&touching, 690, 750).unwrap());

        // Cancelled rows stop blocking
        db.cancel_reservation(&first.id).unwrap();
        let replacing = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "10:00",
            "11:00",
            "2024-05-01T09:03:00",
        );
        assert!(db.create_reservation(&replacing, 600, 660).unwrap());
    }

    #[test]
    fn test_query_ordering() {
        let db = Database::open_in_memory().unwrap();
        let space = test_space("Main Field");
        let user = test_user("ada@example.com");
        db.create_space(&space).unwrap();
        db.create_user(&user).unwrap();

        let early = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "14:00",
            "15:00",
            "2024-05-01T09:00:00",
        );
        let late = test_reservation(
            &space,
            &user,
            "2024-06-01",
            "09:00",
            "10:00",
            "2024-05-02T09:00:00",
        );
        assert!(db.create_reservation(&early, 840, 900).unwrap());
        assert!(db.create_reservation(&late, 540, 600).unwrap());

        // Schedule is ascending by start time
        let schedule = db.schedule_for_space(&space.id, "2024-06-01").unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].start_time, "09:00");
        assert_eq!(schedule[1].start_time, "14:00");

        // User listing is newest created_at first
        let mine = db.reservations_for_user(&user.id).unwrap();
        assert_eq!(mine[0].id, late.id);
        assert_eq!(mine[1].id, early.id);

        // Cancelled rows vanish from both feeds
        db.cancel_reservation(&late.id).unwrap();
        assert_eq!(db.schedule_for_space(&space.id, "2024-06-01").unwrap().len(), 1);
        assert_eq!(db.reservations_for_user(&user.id).unwrap().len(), 1);

        // but stay queryable by id
        let cancelled = db.get_reservation(&late.id).unwrap().unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_count_active_reservations() {
        let db = Database::open_in_memory().unwrap();
        let space = test_space("Main Field");
        let user = test_user("ada@example.com");
        db.create_space(&space).unwrap();
        db.create_user(&user).unwrap();

        let past = test_reservation(
            &space,
            &user,
            "2024-05-01",
            "10:00",
            "11:00",
            "2024-04-01T09:00:00",
        );
        let future_a = test_reservation(
            &space,
            &user,
            "2024-06-10",
            "10:00",
            "11:00",
            "2024-05-01T09:00:00",
        );
        let future_b = test_reservation(
            &space,
            &user,
            "2024-06-11",
            "10:00",
            "11:00",
            "2024-05-01T09:01:00",
        );
        assert!(db.create_reservation(&past, 600, 660).unwrap());
        assert!(db.create_reservation(&future_a, 600, 660).unwrap());
        assert!(db.create_reservation(&future_b, 600, 660).unwrap());

        assert_eq!(
            db.count_active_reservations(&user.id, "2024-06-01").unwrap(),
            2
        );

        db.cancel_reservation(&future_a.id).unwrap();
        assert_eq!(
            db.count_active_reservations(&user.id, "2024-06-01").unwrap(),
            1
        );
    }

    #[test]
    fn test_settings_singleton() {
        let db = Database::open_in_memory().unwrap();

        let settings = db.get_settings().unwrap();
        assert_eq!(settings.max_advance_days, Some(30));
        assert_eq!(settings.max_concurrent_reservations, Some(3));

        let updated = SystemSettings {
            max_advance_days: None,
            max_concurrent_reservations: Some(5),
            internal_message: "New note".to_string(),
        };
        db.update_settings(&updated).unwrap();

        let settings = db.get_settings().unwrap();
        assert_eq!(settings.max_advance_days, None);
        assert_eq!(settings.max_concurrent_reservations, Some(5));
        assert_eq!(settings.internal_message, "New note");
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservd.db");
        {
            let db = Database::open(&path).unwrap();
            db.create_space(&test_space("Main Field")).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_spaces().unwrap().len(), 1);
    }
}
