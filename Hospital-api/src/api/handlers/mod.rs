pub mod auth;
pub mod health;
pub mod patients;

// Re-export handlers for easier imports
pub use auth::{login, register};
pub use health::health_check;
pub use patients::{create_patient, delete_patient, get_patient, list_patients, update_patient};
