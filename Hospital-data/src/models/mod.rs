// Storage models, one per collection
pub mod credential;
pub mod patient;
pub mod user;
