// Hospital Data
// This crate owns the SQLite database and the repositories over its collections

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
