// Repository module structure
pub mod errors;
mod credential;
mod in_memory;
mod patient;
mod storage;
mod user;

// Re-export commonly used types
pub use credential::{CredentialRepository, CredentialRepositoryTrait};
pub use errors::RepositoryError;
pub use in_memory::{InMemoryCredentialRepository, InMemoryPatientRepository, InMemoryUserRepository};
pub use patient::{PatientRepository, PatientRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
