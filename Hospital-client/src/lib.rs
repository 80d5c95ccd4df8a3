//! Client for the hospital API
//!
//! [`ApiClient::fetch_api`] sends a JSON request to `{base_url}{endpoint}`,
//! attaching the stored bearer token when there is one. The typed helpers in
//! [`api`] are built on it.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod token_store;

pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::ClientError;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
