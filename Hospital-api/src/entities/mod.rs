// Public entities for the hospital API
// This module contains data structures that are shared across the application boundary

// Response envelope
pub mod common;

// Auth entities
pub mod auth;
