//! Initial data for a fresh hospital database
//!
//! Seeding is idempotent: the credential and admin user are keyed by
//! username, and sample patients are only written into an empty table.

use std::env;

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::password::{hash_password, PasswordError};
use crate::entities::user::Role;
use hospital_data::database::DatabasePool;
use hospital_data::models::credential::RoleGrant;
use hospital_data::models::patient::NewPatient;
use hospital_data::models::user::NewUser;
use hospital_data::repository::{
    CredentialRepository, CredentialRepositoryTrait, PatientRepository, PatientRepositoryTrait,
    RepositoryError, UserRepository, UserRepositoryTrait,
};

const DEFAULT_PASSWORD: &str = "password123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Seeding failed in storage: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Seeding failed to hash a password: {0}")]
    Password(#[from] PasswordError),
}

/// Accounts written by the seeder
#[derive(Clone)]
pub struct SeedConfig {
    pub database_name: String,
    pub db_username: String,
    pub db_password: String,
    pub db_role: String,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("database_name", &self.database_name)
            .field("db_username", &self.db_username)
            .field("db_role", &self.db_role)
            .field("admin_username", &self.admin_username)
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            database_name: "hospital".to_string(),
            db_username: "admin".to_string(),
            db_password: DEFAULT_PASSWORD.to_string(),
            db_role: "readWrite".to_string(),
            admin_username: "admin".to_string(),
            admin_password: DEFAULT_PASSWORD.to_string(),
            admin_email: "admin@hospital.local".to_string(),
        }
    }
}

impl SeedConfig {
    /// Defaults, with the admin password taken from `SEED_ADMIN_PASSWORD` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        match env::var("SEED_ADMIN_PASSWORD") {
            Ok(password) if !password.is_empty() => config.admin_password = password,
            _ => warn!("SEED_ADMIN_PASSWORD not set, seeding admin with the default password"),
        }
        config
    }
}

/// The two sample patients
pub fn sample_patients() -> Vec<NewPatient> {
    vec![
        NewPatient {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            dob: "1990-01-01".to_string(),
            gender: "Male".to_string(),
        },
        NewPatient {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            dob: "1995-02-01".to_string(),
            gender: "Female".to_string(),
        },
    ]
}

/// What a seeding run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub credential_created: bool,
    pub admin_created: bool,
    pub patients_inserted: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        !self.credential_created && !self.admin_created && self.patients_inserted == 0
    }
}

pub struct Seeder<C, U, P> {
    credentials: C,
    users: U,
    patients: P,
    config: SeedConfig,
}

impl<C, U, P> Seeder<C, U, P>
where
    C: CredentialRepositoryTrait,
    U: UserRepositoryTrait,
    P: PatientRepositoryTrait,
{
    pub fn new(credentials: C, users: U, patients: P, config: SeedConfig) -> Self {
        Self {
            credentials,
            users,
            patients,
            config,
        }
    }

    /// Run every step in order; the first failure aborts the run
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        let config = &self.config;

        report.credential_created = self
            .credentials
            .provision(
                &config.db_username,
                &hash_password(&config.db_password)?,
                vec![RoleGrant {
                    role: config.db_role.clone(),
                    db: config.database_name.clone(),
                }],
            )
            .await?;

        report.admin_created = self
            .users
            .create_if_absent(NewUser {
                username: config.admin_username.clone(),
                password_hash: hash_password(&config.admin_password)?,
                email: config.admin_email.clone(),
                first_name: "System".to_string(),
                last_name: "Administrator".to_string(),
                role: Role::Admin.to_string(),
            })
            .await?;

        if self.patients.count().await? == 0 {
            report.patients_inserted = self.patients.insert_many(sample_patients()).await?.len();
        }

        if report.is_noop() {
            info!("Database already seeded, nothing to do");
        } else {
            info!(
                credential_created = report.credential_created,
                admin_created = report.admin_created,
                patients_inserted = report.patients_inserted,
                "Database seeded"
            );
        }

        Ok(report)
    }
}

/// Seed the SQLite database behind `pool`
pub async fn seed_database(pool: &DatabasePool, config: SeedConfig) -> Result<SeedReport, SeedError> {
    Seeder::new(
        CredentialRepository::new(pool.clone()),
        UserRepository::new(pool.clone()),
        PatientRepository::new(pool.clone()),
        config,
    )
    .run()
    .await
}
