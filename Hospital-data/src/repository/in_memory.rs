//! In-memory repositories used by tests and by callers that run without a database file.
//!
//! Clones share the same underlying storage.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::credential::CredentialRepositoryTrait;
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;
use super::user::UserRepositoryTrait;
use crate::models::credential::{DatabaseCredential, RoleGrant};
use crate::models::patient::{NewPatient, Patient, PatientChanges};
use crate::models::user::{NewUser, User};

/// In-memory patient storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryPatientRepository {
    patients: Arc<Mutex<Vec<Patient>>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn build(new: NewPatient) -> Patient {
        let now = Utc::now().to_rfc3339();
        Patient {
            id: Uuid::new_v4().to_string(),
            first_name: new.first_name,
            last_name: new.last_name,
            dob: new.dob,
            gender: new.gender,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[async_trait]
impl PatientRepositoryTrait for InMemoryPatientRepository {
    async fn create(&self, patient: NewPatient) -> Result<Patient, RepositoryError> {
        let patient = Self::build(patient);
        self.patients.lock()?.push(patient.clone());
        Ok(patient)
    }

    async fn insert_many(&self, patients: Vec<NewPatient>) -> Result<Vec<Patient>, RepositoryError> {
        let inserted: Vec<Patient> = patients.into_iter().map(Self::build).collect();
        self.patients.lock()?.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn get_all(&self) -> Result<Vec<Patient>, RepositoryError> {
        Ok(self.patients.lock()?.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.patients.lock()?.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: &str, changes: PatientChanges) -> Result<Option<Patient>, RepositoryError> {
        let mut store = self.patients.lock()?;
        match store.iter_mut().find(|p| p.id == id) {
            Some(patient) => {
                changes.apply_to(patient);
                patient.updated_at = Utc::now().to_rfc3339();
                Ok(Some(patient.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.patients.lock()?;
        let before = store.len();
        store.retain(|p| p.id != id);
        Ok(store.len() != before)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.patients.lock()?.len())
    }
}

/// In-memory user storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn build(new: NewUser) -> User {
        let now = Utc::now().to_rfc3339();
        User {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            password_hash: new.password_hash,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut store = self.users.lock()?;
        if store.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("username already exists".to_string()));
        }
        let user = Self::build(user);
        store.push(user.clone());
        Ok(user)
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<bool, RepositoryError> {
        let mut store = self.users.lock()?;
        if store.iter().any(|u| u.username == user.username) {
            return Ok(false);
        }
        store.push(Self::build(user));
        Ok(true)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock()?.iter().find(|u| u.username == username).cloned())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.users.lock()?.len())
    }
}

/// In-memory credential storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    credentials: Arc<Mutex<Vec<DatabaseCredential>>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepositoryTrait for InMemoryCredentialRepository {
    async fn provision(
        &self,
        username: &str,
        password_hash: &str,
        roles: Vec<RoleGrant>,
    ) -> Result<bool, RepositoryError> {
        let mut store = self.credentials.lock()?;
        if store.iter().any(|c| c.username == username) {
            return Ok(false);
        }
        store.push(DatabaseCredential {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            roles,
            created_at: Utc::now().to_rfc3339(),
        });
        Ok(true)
    }

    async fn get(&self, username: &str) -> Result<Option<DatabaseCredential>, RepositoryError> {
        Ok(self.credentials.lock()?.iter().find(|c| c.username == username).cloned())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.credentials.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryPatientRepository::new();
        let clone = repo.clone();

        clone
            .create(NewPatient {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                dob: "1995-02-01".to_string(),
                gender: "Female".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 1, "Cloned repository should share storage");
    }

    #[tokio::test]
    async fn test_in_memory_users_reject_duplicates() {
        let repo = InMemoryUserRepository::new();
        let user = NewUser {
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: "admin".to_string(),
        };

        repo.create(user.clone()).await.unwrap();
        assert!(matches!(repo.create(user.clone()).await, Err(RepositoryError::Conflict(_))));
        assert!(!repo.create_if_absent(user).await.unwrap());
    }
}
