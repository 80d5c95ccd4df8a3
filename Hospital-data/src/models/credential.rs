use serde::{Deserialize, Serialize};

/// A role granted to a database credential on a named database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

/// A provisioned database-level account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCredential {
    /// Account name
    pub username: String,

    /// Argon2id PHC hash of the account password
    pub password_hash: String,

    /// Granted roles
    pub roles: Vec<RoleGrant>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}
