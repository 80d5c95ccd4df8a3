use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::credential::{DatabaseCredential, RoleGrant};
use crate::models::patient::{NewPatient, Patient, PatientChanges};
use crate::models::user::{NewUser, User};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, dob, gender, created_at, updated_at";
const USER_COLUMNS: &str =
    "id, username, password_hash, email, first_name, last_name, role, created_at, updated_at";

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        dob: row.get(3)?,
        gender: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        role: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn build_patient(new: NewPatient) -> Patient {
    let timestamp = now();
    Patient {
        id: Uuid::new_v4().to_string(),
        first_name: new.first_name,
        last_name: new.last_name,
        dob: new.dob,
        gender: new.gender,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    }
}

fn build_user(new: NewUser) -> User {
    let timestamp = now();
    User {
        id: Uuid::new_v4().to_string(),
        username: new.username,
        password_hash: new.password_hash,
        email: new.email,
        first_name: new.first_name,
        last_name: new.last_name,
        role: new.role,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    }
}

/// SQL operations for the three collections
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Insert one patient
    pub fn insert_patient(pool: &DatabasePool, new: NewPatient) -> Result<Patient, RepositoryError> {
        let patient = build_patient(new);
        debug!("Storing patient in database: id={}", patient.id);

        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO patients (id, first_name, last_name, dob, gender, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.dob,
                patient.gender,
                patient.created_at,
                patient.updated_at,
            ],
        )
        .map_err(|e| RepositoryError::from_insert(e, "patient"))?;

        Ok(patient)
    }

    /// Insert several patients in one transaction; either all land or none do
    pub fn insert_patients(
        pool: &DatabasePool,
        batch: Vec<NewPatient>,
    ) -> Result<Vec<Patient>, RepositoryError> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(batch.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO patients (id, first_name, last_name, dob, gender, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for new in batch {
                let patient = build_patient(new);
                stmt.execute(params![
                    patient.id,
                    patient.first_name,
                    patient.last_name,
                    patient.dob,
                    patient.gender,
                    patient.created_at,
                    patient.updated_at,
                ])
                .map_err(|e| RepositoryError::from_insert(e, "patient"))?;
                inserted.push(patient);
            }
        }

        tx.commit()?;
        debug!("Inserted {} patients", inserted.len());
        Ok(inserted)
    }

    /// All patients in insertion order
    pub fn all_patients(pool: &DatabasePool) -> Result<Vec<Patient>, RepositoryError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY rowid ASC",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
        let mut result = Vec::new();
        for patient in rows {
            result.push(patient?);
        }
        Ok(result)
    }

    pub fn patient_by_id(pool: &DatabasePool, id: &str) -> Result<Option<Patient>, RepositoryError> {
        let conn = pool.get()?;
        let patient = conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?1", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()?;
        Ok(patient)
    }

    /// Apply changes and bump `updated_at`; `None` when the id is unknown
    ///
    /// The read and the write share one immediate transaction, so a
    /// concurrent update or delete cannot land in between.
    pub fn update_patient(
        pool: &DatabasePool,
        id: &str,
        changes: &PatientChanges,
    ) -> Result<Option<Patient>, RepositoryError> {
        let mut conn = pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = tx
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?1", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()?;
        let Some(mut patient) = current else {
            return Ok(None);
        };

        changes.apply_to(&mut patient);
        patient.updated_at = now();

        let affected = tx.execute(
            "UPDATE patients
             SET first_name = ?2, last_name = ?3, dob = ?4, gender = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.dob,
                patient.gender,
                patient.updated_at,
            ],
        )?;
        if affected == 0 {
            return Ok(None);
        }

        tx.commit()?;
        Ok(Some(patient))
    }

    pub fn delete_patient(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        let conn = pool.get()?;
        let affected = conn.execute("DELETE FROM patients WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    pub fn count_patients(pool: &DatabasePool) -> Result<usize, RepositoryError> {
        let conn = pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a user; a taken username is a `Conflict`
    pub fn insert_user(pool: &DatabasePool, new: NewUser) -> Result<User, RepositoryError> {
        let user = build_user(new);
        debug!("Storing user in database: username={}", user.username);

        let conn = pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                USER_COLUMNS
            ),
            params![
                user.id,
                user.username,
                user.password_hash,
                user.email,
                user.first_name,
                user.last_name,
                user.role,
                user.created_at,
                user.updated_at,
            ],
        )
        .map_err(|e| RepositoryError::from_insert(e, "username"))?;

        Ok(user)
    }

    /// Insert the user unless the username is taken; returns whether a row was written
    pub fn insert_user_if_absent(pool: &DatabasePool, new: NewUser) -> Result<bool, RepositoryError> {
        let user = build_user(new);

        let conn = pool.get()?;
        let affected = conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(username) DO NOTHING",
                USER_COLUMNS
            ),
            params![
                user.id,
                user.username,
                user.password_hash,
                user.email,
                user.first_name,
                user.last_name,
                user.role,
                user.created_at,
                user.updated_at,
            ],
        )?;

        Ok(affected > 0)
    }

    pub fn user_by_username(pool: &DatabasePool, username: &str) -> Result<Option<User>, RepositoryError> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn count_users(pool: &DatabasePool) -> Result<usize, RepositoryError> {
        let conn = pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Record a database credential unless one with the same username exists
    pub fn insert_credential_if_absent(
        pool: &DatabasePool,
        username: &str,
        password_hash: &str,
        roles: &[RoleGrant],
    ) -> Result<bool, RepositoryError> {
        let roles = serde_json::to_string(roles)?;

        let conn = pool.get()?;
        let affected = conn.execute(
            "INSERT INTO database_credentials (username, password_hash, roles, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(username) DO NOTHING",
            params![username, password_hash, roles, now()],
        )?;

        Ok(affected > 0)
    }

    pub fn credential_by_username(
        pool: &DatabasePool,
        username: &str,
    ) -> Result<Option<DatabaseCredential>, RepositoryError> {
        let conn = pool.get()?;
        let row = conn
            .query_row(
                "SELECT username, password_hash, roles, created_at
                 FROM database_credentials WHERE username = ?1",
                [username],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((username, password_hash, roles, created_at)) => Ok(Some(DatabaseCredential {
                username,
                password_hash,
                roles: serde_json::from_str(&roles)?,
                created_at,
            })),
            None => Ok(None),
        }
    }

    pub fn count_credentials(pool: &DatabasePool) -> Result<usize, RepositoryError> {
        let conn = pool.get()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM database_credentials", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
