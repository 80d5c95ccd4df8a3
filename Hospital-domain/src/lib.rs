// Hospital Domain
// This crate contains the business logic for the hospital records service

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Initial data
pub mod seed;

// Re-export the database module from hospital_data for convenience
pub use hospital_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
