//! Database connection module for the hospital records service
//!
//! Wraps an `r2d2` pool of SQLite connections. The database name mirrors the
//! logical database the seeded credential is granted on (`hospital`).

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Global database pool used by the server binaries
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Default logical database name
pub const DEFAULT_DATABASE_NAME: &str = "hospital";

/// Where the SQLite data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// File-backed database
    File(String),
    /// Private in-memory database (single connection)
    Memory,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Logical database name
    pub name: String,
    /// Where to open the database
    pub location: DatabaseLocation,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATABASE_NAME.to_string(),
            location: DatabaseLocation::File("./data/hospital.db".to_string()),
            pool_size: 10,
            timeout_seconds: 10,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a throwaway in-memory database
    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            pool_size: 1,
            ..Self::default()
        }
    }

    /// Create a new database configuration from environment variables
    ///
    /// `DB_SQLITE_PATH` selects the file (`:memory:` selects an in-memory
    /// database), `DB_NAME`, `DB_POOL_SIZE` and `DB_TIMEOUT_SECONDS` tune the pool.
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let location = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path == ":memory:" => DatabaseLocation::Memory,
            Ok(path) => DatabaseLocation::File(path),
            Err(_) => {
                let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
                let path = Path::new(&data_dir).join("hospital.db");
                DatabaseLocation::File(path.to_string_lossy().to_string())
            }
        };

        let name = env::var("DB_NAME").unwrap_or(defaults.name);
        let pool_size = parse_env("DB_POOL_SIZE", defaults.pool_size)?;
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        // A private in-memory database only exists on the connection that opened it
        let pool_size = if location == DatabaseLocation::Memory { 1 } else { pool_size };

        info!(
            "Database configuration: name={}, location={:?}, pool_size={}, timeout={}s",
            name, location, pool_size, timeout_seconds
        );

        Ok(Self {
            name,
            location,
            pool_size,
            timeout_seconds,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| DatabaseError::InvalidEnvVar(key.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Shared SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabasePool {
    name: String,
    inner: Arc<r2d2::Pool<SqliteConnectionManager>>,
}

impl DatabasePool {
    /// Open a pool for the given configuration and run migrations on it
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let manager = match &config.location {
            DatabaseLocation::File(path) => {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        info!("Creating database directory: {:?}", parent);
                        std::fs::create_dir_all(parent)?;
                    }
                }
                info!("Opening SQLite database at: {}", path);
                SqliteConnectionManager::file(path)
                    .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
            }
            DatabaseLocation::Memory => {
                info!("Opening in-memory SQLite database");
                SqliteConnectionManager::memory()
            }
        };

        // Writers queue behind an open write transaction instead of failing with SQLITE_BUSY
        let manager = manager.with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.timeout_seconds))
            .build(manager)?;

        let pool = Self {
            name: config.name.clone(),
            inner: Arc::new(pool),
        };

        let conn = pool.get()?;
        run_sqlite_migrations(&conn)?;

        Ok(pool)
    }

    /// In-memory pool, already migrated
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseConfig::in_memory())
    }

    /// Logical database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check out a pooled connection
    pub fn get(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, DatabaseError> {
        Ok(self.inner.get()?)
    }

    /// Round-trip a trivial query to prove the database answers
    pub fn ping(&self) -> Result<(), DatabaseError> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Human-readable description of the pool for health reporting
    pub fn describe(&self) -> String {
        let location = match self.get() {
            Ok(conn) => conn
                .query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2))
                .map(|path| {
                    if path.is_empty() {
                        "SQLite in-memory database".to_string()
                    } else {
                        format!("SQLite database at {}", path)
                    }
                })
                .unwrap_or_else(|_| "SQLite database (path unknown)".to_string()),
            Err(e) => {
                error!("Failed to get SQLite connection: {}", e);
                return format!("SQLite connection error: {}", e);
            }
        };

        let state = self.inner.state();
        format!(
            "{} (connections: active={}, idle={})",
            location, state.connections, state.idle_connections
        )
    }
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    let pool = DatabasePool::connect(&config)?;

    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    info!("Database pool initialized successfully");
    Ok(pool)
}

/// Get the global database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}
