use serde::{Deserialize, Serialize};

/// Storage model for an application user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID string)
    pub id: String,

    /// Login name, unique across users
    pub username: String,

    /// Argon2id PHC hash of the password
    pub password_hash: String,

    /// Contact email
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Role name (admin, doctor, nurse, patient)
    pub role: String,

    /// RFC 3339 creation timestamp
    pub created_at: String,

    /// RFC 3339 last update timestamp
    pub updated_at: String,
}

/// Input data for inserting a new user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}
