//! Database module for Dentoria.
//!
//! This module provides the persistence client for the application: a single,
//! process-wide handle to the SQLite database, constructed once from the
//! `DATABASE_URL` environment variable and shared between the UI loop and
//! mutation worker threads. It encapsulates all database-related logic:
//! schema setup, user authentication, and the doctor CRUD surface. The
//! primary entry points are [`init`], [`client`], and the methods on
//! [`Client`] such as `create_doctor` and `all_doctors`.

use crate::models::{Doctor, Gender};
use anyhow::{anyhow, Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use once_cell::sync::OnceCell;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// Name of the environment variable holding the database path.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// The process-wide client, set exactly once by [`init`].
static CLIENT: OnceCell<Arc<Client>> = OnceCell::new();

/// A shared handle to the Dentoria database.
///
/// Access from concurrent threads is serialized through the internal lock;
/// callers never manage locking themselves. The connection slot is an
/// `Option` so [`Client::close`] can drain it explicitly in tests.
pub struct Client {
    conn: Mutex<Option<Connection>>,
}

/// Initializes the process-wide database client.
///
/// Reads `DATABASE_URL`, opens (or creates) the database at that path,
/// applies the embedded schema, and seeds a default "admin" user if one
/// does not exist. Called once from `main` before the UI starts.
///
/// # Errors
///
/// Fails if `DATABASE_URL` is unset or the database cannot be opened.
/// Both are fatal: the application must not reach the UI loop without a
/// database target.
pub fn init() -> Result<Arc<Client>> {
    let url = std::env::var(DATABASE_URL_VAR).map_err(|_| {
        anyhow!("DATABASE_URL is not set. Dentoria requires a database path at startup.")
    })?;

    let client = CLIENT.get_or_try_init(|| Client::open(&url).map(Arc::new))?;
    Ok(Arc::clone(client))
}

/// Returns the client initialized by [`init`].
///
/// # Errors
///
/// Fails if [`init`] has not been called yet.
pub fn client() -> Result<Arc<Client>> {
    CLIENT
        .get()
        .cloned()
        .ok_or_else(|| anyhow!("database client is not initialized"))
}

impl Client {
    /// Opens a client against the database at `path`.
    ///
    /// Applies the schema from `schema.sql` and seeds the default "admin"
    /// user (password "admin") when the users table is empty of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, the schema cannot
    /// be executed, or the default user cannot be created.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {path}"))?;

        let schema = include_str!("schema.sql");
        conn.execute_batch(schema)
            .context("Failed to execute schema")?;

        let mut stmt = conn.prepare("SELECT COUNT(*) FROM users WHERE username = ?")?;
        let count: i64 = stmt.query_row(params!["admin"], |row| row.get(0))?;
        drop(stmt);

        if count == 0 {
            let hashed_password = hash("admin", DEFAULT_COST).context("Failed to hash password")?;
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?, ?)",
                params!["admin", hashed_password],
            )?;
        }

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Closes the underlying connection.
    ///
    /// Later operations on this client fail with a descriptive error. The
    /// process-wide client is never closed in normal operation; this hook
    /// exists so tests can drain the handle deterministically.
    pub fn close(&self) {
        if let Ok(mut guard) = self.conn.lock() {
            guard.take();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))
    }

    /// Verifies a username and password against the users table.
    ///
    /// # Returns
    ///
    /// The user's ID on success; an error if the user is unknown or the
    /// password does not match the stored bcrypt hash.
    pub fn authenticate_user(&self, username: &str, password: &str) -> Result<i64> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let mut stmt = conn.prepare("SELECT id, password_hash FROM users WHERE username = ?")?;
        let row: Option<(i64, String)> = stmt
            .query_row(params![username], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let (user_id, stored_hash) = row.ok_or_else(|| anyhow!("Invalid credentials"))?;

        if verify(password, &stored_hash).context("Failed to verify password")? {
            Ok(user_id)
        } else {
            Err(anyhow!("Invalid credentials"))
        }
    }

    /// Creates a new user with a bcrypt-hashed password.
    pub fn create_user(&self, username: &str, password: &str) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let hashed_password = hash(password, DEFAULT_COST).context("Failed to hash password")?;
        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?, ?)",
            params![username, hashed_password],
        )?;
        Ok(())
    }

    /// Retrieves the username for a user ID.
    pub fn username_of(&self, user_id: i64) -> Result<String> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let mut stmt = conn.prepare("SELECT username FROM users WHERE id = ?")?;
        let username: String = stmt.query_row(params![user_id], |row| row.get(0))?;
        Ok(username)
    }

    /// Inserts a new doctor and returns the persisted row.
    ///
    /// The draft's `id` and `created_at` are ignored; the database assigns
    /// both. A duplicate email is reported as a distinct, user-readable
    /// error so the dialog can surface it next to the form.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken or the insert fails.
    pub fn create_doctor(&self, doctor: &Doctor) -> Result<Doctor> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let result = conn.execute(
            "INSERT INTO doctors (name, email, phone, speciality, gender, is_active, image_url) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                doctor.name,
                doctor.email,
                doctor.phone,
                doctor.speciality,
                doctor.gender.as_str(),
                doctor.is_active,
                doctor.image_url,
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(anyhow!(
                    "A doctor with email {} already exists",
                    doctor.email
                ));
            }
            Err(e) => return Err(e).context("Failed to create doctor"),
        }

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, speciality, gender, is_active, image_url, created_at FROM doctors WHERE id = ?",
        )?;
        let created = stmt.query_row(params![id], doctor_from_row)?;
        Ok(created)
    }

    /// Retrieves all doctors, ordered by name.
    pub fn all_doctors(&self) -> Result<Vec<Doctor>> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, speciality, gender, is_active, image_url, created_at FROM doctors ORDER BY name",
        )?;
        let doctor_iter = stmt.query_map([], doctor_from_row)?;

        let mut doctors = Vec::new();
        for doctor in doctor_iter {
            doctors.push(doctor?);
        }
        Ok(doctors)
    }

    /// Retrieves a single doctor by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if no doctor with that ID exists.
    pub fn find_doctor(&self, doctor_id: i64) -> Result<Doctor> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, speciality, gender, is_active, image_url, created_at FROM doctors WHERE id = ?",
        )?;
        let doctor: Option<Doctor> = stmt.query_row(params![doctor_id], doctor_from_row).optional()?;

        doctor.ok_or_else(|| anyhow!("Doctor not found"))
    }

    /// Updates an existing doctor identified by its `id`.
    pub fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        conn.execute(
            "UPDATE doctors SET name = ?, email = ?, phone = ?, speciality = ?, gender = ?, is_active = ?, image_url = ? WHERE id = ?",
            params![
                doctor.name,
                doctor.email,
                doctor.phone,
                doctor.speciality,
                doctor.gender.as_str(),
                doctor.is_active,
                doctor.image_url,
                doctor.id,
            ],
        )?;
        Ok(())
    }

    /// Sets only the active flag of a doctor.
    pub fn set_doctor_active(&self, doctor_id: i64, is_active: bool) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        conn.execute(
            "UPDATE doctors SET is_active = ? WHERE id = ?",
            params![is_active, doctor_id],
        )?;
        Ok(())
    }

    /// Deletes a doctor by ID.
    pub fn delete_doctor(&self, doctor_id: i64) -> Result<()> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or_else(|| anyhow!("client is closed"))?;

        conn.execute("DELETE FROM doctors WHERE id = ?", params![doctor_id])?;
        Ok(())
    }
}

/// Maps a `doctors` row onto the [`Doctor`] model.
fn doctor_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        speciality: row.get(4)?,
        gender: Gender::parse(&row.get::<_, String>(5)?).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                5,
                String::from("Invalid gender value"),
                rusqlite::types::Type::Text,
            )
        })?,
        is_active: row.get(6)?,
        image_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_client() -> Client {
        let path = std::env::temp_dir().join(format!(
            "dentoria-test-{}-{}.db",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&path);
        Client::open(path.to_str().unwrap()).unwrap()
    }

    fn sample_doctor(email: &str) -> Doctor {
        Doctor {
            id: 0,
            name: "Dr. Jane Roe".into(),
            email: email.into(),
            phone: "(555) 123-4567".into(),
            speciality: "Orthodontics".into(),
            gender: Gender::Female,
            is_active: true,
            image_url: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn create_assigns_id_and_timestamp() {
        let client = temp_client();
        let created = client.create_doctor(&sample_doctor("jane@example.com")).unwrap();
        assert!(created.id > 0);
        assert!(!created.created_at.is_empty());
        assert_eq!(created.name, "Dr. Jane Roe");
        assert_eq!(created.gender, Gender::Female);
        assert!(created.is_active);
        client.close();
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let client = temp_client();
        client.create_doctor(&sample_doctor("dup@example.com")).unwrap();
        let err = client
            .create_doctor(&sample_doctor("dup@example.com"))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        client.close();
    }

    #[test]
    fn all_doctors_orders_by_name() {
        let client = temp_client();
        let mut second = sample_doctor("b@example.com");
        second.name = "Dr. Zoe Park".into();
        client.create_doctor(&second).unwrap();
        client.create_doctor(&sample_doctor("a@example.com")).unwrap();

        let doctors = client.all_doctors().unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].name, "Dr. Jane Roe");
        assert_eq!(doctors[1].name, "Dr. Zoe Park");
        client.close();
    }

    #[test]
    fn find_update_and_delete_round_trip() {
        let client = temp_client();
        let mut created = client.create_doctor(&sample_doctor("rt@example.com")).unwrap();

        created.speciality = "Endodontics".into();
        client.update_doctor(&created).unwrap();
        let found = client.find_doctor(created.id).unwrap();
        assert_eq!(found.speciality, "Endodontics");

        client.set_doctor_active(created.id, false).unwrap();
        assert!(!client.find_doctor(created.id).unwrap().is_active);

        client.delete_doctor(created.id).unwrap();
        assert!(client.find_doctor(created.id).is_err());
        client.close();
    }

    #[test]
    fn seeded_admin_authenticates() {
        let client = temp_client();
        let user_id = client.authenticate_user("admin", "admin").unwrap();
        assert_eq!(client.username_of(user_id).unwrap(), "admin");
        assert!(client.authenticate_user("admin", "wrong").is_err());
        assert!(client.authenticate_user("nobody", "admin").is_err());
        client.close();
    }

    #[test]
    fn created_user_can_sign_in() {
        let client = temp_client();
        client.create_user("reception", "hunter2").unwrap();
        let user_id = client.authenticate_user("reception", "hunter2").unwrap();
        assert_eq!(client.username_of(user_id).unwrap(), "reception");
        client.close();
    }

    #[test]
    fn closed_client_reports_errors() {
        let client = temp_client();
        client.close();
        let err = client.all_doctors().unwrap_err();
        assert!(err.to_string().contains("closed"));
    }
}
