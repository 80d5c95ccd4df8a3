use async_trait::async_trait;

use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use crate::database::DatabasePool;
use crate::models::credential::{DatabaseCredential, RoleGrant};

/// Repository trait for provisioned database credentials
#[async_trait]
pub trait CredentialRepositoryTrait: Send + Sync {
    /// Record a credential unless one with the same username exists
    async fn provision(
        &self,
        username: &str,
        password_hash: &str,
        roles: Vec<RoleGrant>,
    ) -> Result<bool, RepositoryError>;

    async fn get(&self, username: &str) -> Result<Option<DatabaseCredential>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// SQLite-backed credential repository
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: DatabasePool,
}

impl CredentialRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepositoryTrait for CredentialRepository {
    async fn provision(
        &self,
        username: &str,
        password_hash: &str,
        roles: Vec<RoleGrant>,
    ) -> Result<bool, RepositoryError> {
        DatabaseStorage::insert_credential_if_absent(&self.pool, username, password_hash, &roles)
    }

    async fn get(&self, username: &str) -> Result<Option<DatabaseCredential>, RepositoryError> {
        DatabaseStorage::credential_by_username(&self.pool, username)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        DatabaseStorage::count_credentials(&self.pool)
    }
}
