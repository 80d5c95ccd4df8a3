use async_trait::async_trait;
use tracing::debug;

use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use crate::database::DatabasePool;
use crate::models::patient::{NewPatient, Patient, PatientChanges};

/// Repository trait for patient documents
#[async_trait]
pub trait PatientRepositoryTrait: Send + Sync {
    /// Insert a new patient
    async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError>;

    /// Insert a batch of patients atomically
    async fn insert_many(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, RepositoryError>;

    /// All patients in insertion order
    async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError>;

    /// Look up a patient by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Patient>, RepositoryError>;

    /// Apply a partial update; `None` when the ID is unknown
    async fn update(&self, id: &str, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError>;

    /// Remove a patient; `false` when the ID is unknown
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Number of stored patients
    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// SQLite-backed patient repository
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: DatabasePool,
}

impl PatientRepository {
    /// Create a new repository over a pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepositoryTrait for PatientRepository {
    async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError> {
        DatabaseStorage::insert_patient(&self.pool, patient)
    }

    async fn insert_many(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, RepositoryError> {
        debug!("Inserting {} patients in one transaction", patients.len());
        DatabaseStorage::insert_patients(&self.pool, patients)
    }

    async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError> {
        DatabaseStorage::all_patients(&self.pool)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Patient>, RepositoryError> {
        DatabaseStorage::patient_by_id(&self.pool, id)
    }

    async fn update(&self, id: &str, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError> {
        DatabaseStorage::update_patient(&self.pool, id, &changes)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        DatabaseStorage::delete_patient(&self.pool, id)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        DatabaseStorage::count_patients(&self.pool)
    }
}
