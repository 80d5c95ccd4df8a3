use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_patients_table(conn)?;
    create_database_credentials_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table and its unique username index
fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users (username);",
    )
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create users table: {}", e)))
}

/// Create the patients table
fn create_patients_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating patients table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS patients (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            dob TEXT NOT NULL,
            gender TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_patients_name ON patients (last_name, first_name);",
    )
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create patients table: {}", e)))
}

/// Create the table holding provisioned database credentials
fn create_database_credentials_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating database_credentials table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS database_credentials (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            roles TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .map(|_| ())
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create database_credentials table: {}", e))
    })
}
