use async_trait::async_trait;

use super::errors::RepositoryError;
use super::storage::DatabaseStorage;
use crate::database::DatabasePool;
use crate::models::user::{NewUser, User};

/// Repository trait for application users
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a user; `RepositoryError::Conflict` when the username is taken
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Insert a user only if no user with that username exists
    async fn create_if_absent(&self, user: NewUser) -> Result<bool, RepositoryError>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

/// SQLite-backed user repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        DatabaseStorage::insert_user(&self.pool, user)
    }

    async fn create_if_absent(&self, user: NewUser) -> Result<bool, RepositoryError> {
        DatabaseStorage::insert_user_if_absent(&self.pool, user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        DatabaseStorage::user_by_username(&self.pool, username)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        DatabaseStorage::count_users(&self.pool)
    }
}
