use std::sync::Arc;

use hospital_domain::auth::TokenService;
use hospital_domain::database::DatabasePool;
use hospital_domain::health::{HealthService, HealthServiceTrait};
use hospital_domain::services::{
    create_default_patient_service, create_default_user_service, PatientServiceTrait, UserServiceTrait,
};

pub type PatientServiceRef = Arc<dyn PatientServiceTrait>;
pub type UserServiceRef = Arc<dyn UserServiceTrait>;
pub type HealthServiceRef = Arc<dyn HealthServiceTrait>;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: PatientServiceRef,
    pub users: UserServiceRef,
    pub health: HealthServiceRef,
    pub tokens: TokenService,
    /// Reported by the health endpoint
    pub environment: String,
}

impl AppState {
    /// Wire the SQLite-backed services onto one pool
    pub fn from_pool(pool: DatabasePool, tokens: TokenService, environment: impl Into<String>) -> Self {
        Self {
            patients: Arc::new(create_default_patient_service(pool.clone())),
            users: Arc::new(create_default_user_service(pool.clone(), tokens.clone())),
            health: Arc::new(HealthService::new(pool)),
            tokens,
            environment: environment.into(),
        }
    }
}
