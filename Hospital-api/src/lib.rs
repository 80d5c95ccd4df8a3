// Hospital API lib.rs
//
// HTTP layer for the hospital records service: router, handlers,
// public entities and OpenAPI documentation.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;

pub use api::routes::create_app;
pub use api::state::AppState;
pub use config::AppConfig;
