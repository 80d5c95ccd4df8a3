// Domain entities and value objects
pub mod conversions;
pub mod patient;
pub mod user;

// Re-export common types for easier imports
pub use patient::{CreatePatientRequest, Patient, UpdatePatientRequest};
pub use user::{LoginRequest, RegisterRequest, Role, UserAccount, UserSummary};
