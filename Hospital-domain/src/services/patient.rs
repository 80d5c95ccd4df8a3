use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

use crate::entities::conversions;
use crate::entities::patient::{parse_dob, CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::services::validation_message;
use hospital_data::database::DatabasePool;
use hospital_data::repository::{PatientRepository, PatientRepositoryTrait, RepositoryError};

const FIELD_ORDER: &[&str] = &["first_name", "last_name", "dob", "gender"];

/// Patient service errors
#[derive(Debug, Error)]
pub enum PatientServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for PatientServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => PatientServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => PatientServiceError::Validation(msg),
            other => PatientServiceError::Repository(other.to_string()),
        }
    }
}

/// Trait for patient service operations
#[async_trait]
pub trait PatientServiceTrait: Send + Sync {
    /// All patients in insertion order
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError>;

    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError>;

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientServiceError>;

    /// Apply a partial update
    async fn update_patient(
        &self,
        id: &str,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientServiceError>;

    async fn delete_patient(&self, id: &str) -> Result<(), PatientServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    fn validate_create_request(&self, request: &CreatePatientRequest) -> Result<(), PatientServiceError> {
        if let Err(errors) = request.validate() {
            return Err(PatientServiceError::Validation(validation_message(&errors, FIELD_ORDER)));
        }
        check_not_blank(&request.first_name, "first name is required")?;
        check_not_blank(&request.last_name, "last name is required")?;
        check_not_blank(&request.gender, "gender is required")?;
        parse_dob(&request.dob).map_err(PatientServiceError::Validation)?;
        Ok(())
    }

    fn validate_update_request(&self, request: &UpdatePatientRequest) -> Result<(), PatientServiceError> {
        if request.is_empty() {
            return Err(PatientServiceError::Validation("no fields to update".to_string()));
        }
        if let Err(errors) = request.validate() {
            return Err(PatientServiceError::Validation(validation_message(&errors, FIELD_ORDER)));
        }
        if let Some(first_name) = &request.first_name {
            check_not_blank(first_name, "first name must not be empty")?;
        }
        if let Some(last_name) = &request.last_name {
            check_not_blank(last_name, "last name must not be empty")?;
        }
        if let Some(gender) = &request.gender {
            check_not_blank(gender, "gender must not be empty")?;
        }
        if let Some(dob) = &request.dob {
            parse_dob(dob).map_err(PatientServiceError::Validation)?;
        }
        Ok(())
    }
}

fn check_not_blank(value: &str, message: &str) -> Result<(), PatientServiceError> {
    if value.trim().is_empty() {
        Err(PatientServiceError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

fn not_found(id: &str) -> PatientServiceError {
    PatientServiceError::NotFound(format!("Patient with ID {} not found", id))
}

#[async_trait]
impl<R: PatientRepositoryTrait> PatientServiceTrait for PatientService<R> {
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError> {
        let stored = self.repository.get_all().await?;
        debug!("Loaded {} patients", stored.len());

        stored
            .into_iter()
            .map(|p| conversions::convert_to_domain_patient(p).map_err(PatientServiceError::Repository))
            .collect()
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError> {
        let stored = self.repository.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
        conversions::convert_to_domain_patient(stored).map_err(PatientServiceError::Repository)
    }

    async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientServiceError> {
        self.validate_create_request(&request)?;

        let stored = self
            .repository
            .create(conversions::convert_to_data_new_patient(&request))
            .await?;
        info!("Created patient {}", stored.id);

        conversions::convert_to_domain_patient(stored).map_err(PatientServiceError::Repository)
    }

    async fn update_patient(
        &self,
        id: &str,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientServiceError> {
        self.validate_update_request(&request)?;

        let stored = self
            .repository
            .update(id, conversions::convert_to_data_patient_changes(&request))
            .await?
            .ok_or_else(|| not_found(id))?;
        info!("Updated patient {}", id);

        conversions::convert_to_domain_patient(stored).map_err(PatientServiceError::Repository)
    }

    async fn delete_patient(&self, id: &str) -> Result<(), PatientServiceError> {
        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }
        info!("Deleted patient {}", id);
        Ok(())
    }
}

/// Create a patient service backed by the SQLite repository
pub fn create_default_patient_service(pool: DatabasePool) -> PatientService<PatientRepository> {
    PatientService::new(PatientRepository::new(pool))
}
