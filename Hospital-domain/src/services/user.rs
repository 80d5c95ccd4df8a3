use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use crate::auth::logging::{log_failed_login, log_registration, log_successful_login};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::token::{SecurityError, TokenService};
use crate::entities::conversions;
use crate::entities::user::{LoginRequest, RegisterRequest, Role, UserAccount, UserSummary};
use hospital_data::database::DatabasePool;
use hospital_data::models::user::NewUser;
use hospital_data::repository::{RepositoryError, UserRepository, UserRepositoryTrait};

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Username already taken
    #[error("{0}")]
    Conflict(String),

    /// Unknown user or wrong password; the two are not distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Repository error: {0}")]
    Repository(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] SecurityError),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => UserServiceError::Conflict("Username already exists".to_string()),
            RepositoryError::Validation(msg) => UserServiceError::Validation(msg),
            other => UserServiceError::Repository(other.to_string()),
        }
    }
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

/// Trait for user account operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Create an account from a registration request
    async fn register(&self, request: RegisterRequest) -> Result<UserAccount, UserServiceError>;

    /// Check a username and password
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, UserServiceError>;

    /// Authenticate and issue a token
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, UserServiceError>;
}

/// User service backed by a user repository
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
    tokens: TokenService,
}

impl<R: UserRepositoryTrait> UserService<R> {
    pub fn new(repository: R, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }

    /// Returns the parsed role
    ///
    /// Fields are checked one at a time in request order, presence first
    /// and then the field's own rule, so the first failing check wins.
    fn validate_register_request(&self, request: &RegisterRequest) -> Result<Role, UserServiceError> {
        let errors = request.validate().err();
        let rule_message = |field: &str| -> Option<String> {
            let field_errors = errors.as_ref()?.field_errors();
            let first = field_errors.get(field)?.first()?;
            Some(
                first
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("invalid {}", field)),
            )
        };

        let fields = [
            ("username", &request.username, "username is required"),
            ("password", &request.password, "password is required"),
            ("email", &request.email, "email is required"),
            ("first_name", &request.first_name, "first name is required"),
            ("last_name", &request.last_name, "last name is required"),
            ("role", &request.role, "role is required"),
        ];
        for (field, value, required) in fields {
            if value.is_empty() {
                return Err(UserServiceError::Validation(required.to_string()));
            }
            if let Some(message) = rule_message(field) {
                return Err(UserServiceError::Validation(message));
            }
        }

        request
            .role
            .parse::<Role>()
            .map_err(|_| UserServiceError::Validation("invalid role specified".to_string()))
    }
}

#[async_trait]
impl<R: UserRepositoryTrait> UserServiceTrait for UserService<R> {
    async fn register(&self, request: RegisterRequest) -> Result<UserAccount, UserServiceError> {
        let role = self.validate_register_request(&request)?;

        if self.repository.get_by_username(&request.username).await?.is_some() {
            return Err(UserServiceError::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let stored = self
            .repository
            .create(NewUser {
                username: request.username,
                password_hash,
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                role: role.to_string(),
            })
            .await?;

        log_registration(&stored.username, role.as_str());
        conversions::convert_to_domain_user(stored).map_err(UserServiceError::Repository)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, UserServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(UserServiceError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(stored) = self.repository.get_by_username(username).await? else {
            log_failed_login(username, "Unknown username");
            return Err(UserServiceError::InvalidCredentials);
        };

        match verify_password(password, &stored.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                log_failed_login(username, "Wrong password");
                return Err(UserServiceError::InvalidCredentials);
            }
            Err(e) => {
                error!("Stored password hash for {} is unusable: {}", username, e);
                log_failed_login(username, "Unusable password hash");
                return Err(UserServiceError::InvalidCredentials);
            }
        }

        conversions::convert_to_domain_user(stored).map_err(UserServiceError::Repository)
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, UserServiceError> {
        let start_time = Instant::now();

        let account = self.authenticate(&request.username, &request.password).await?;
        let token = self.tokens.generate_token(&account.username, account.role)?;

        log_successful_login(&account.username, start_time.elapsed().as_millis() as u64);
        info!("User {} logged in with role {}", account.username, account.role);

        Ok(LoginOutcome {
            token,
            user: account.summary(),
        })
    }
}

/// Create a user service backed by the SQLite repository
pub fn create_default_user_service(pool: DatabasePool, tokens: TokenService) -> UserService<UserRepository> {
    UserService::new(UserRepository::new(pool), tokens)
}
