// Testing utilities for the domain layer
// This module is only available when the "mock" feature is enabled

use async_trait::async_trait;

use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::{PatientService, UserService};
use crate::auth::token::TokenService;
use hospital_data::repository::{InMemoryPatientRepository, InMemoryUserRepository};

/// Patient service over an in-memory repository
pub fn in_memory_patient_service() -> PatientService<InMemoryPatientRepository> {
    PatientService::new(InMemoryPatientRepository::new())
}

/// User service over an in-memory repository; the repository handle is returned for seeding
pub fn in_memory_user_service(
    tokens: TokenService,
) -> (UserService<InMemoryUserRepository>, InMemoryUserRepository) {
    let repository = InMemoryUserRepository::new();
    (UserService::new(repository.clone(), tokens), repository)
}

/// Health service reporting a fixed database status
#[derive(Debug)]
pub struct MockHealthService {
    database_up: bool,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MockHealthService {
    pub fn new(database_up: bool) -> Self {
        Self { database_up }
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let (system, component, details) = if self.database_up {
            (SystemStatus::Healthy, ComponentStatus::Healthy, "mock database")
        } else {
            (SystemStatus::Unhealthy, ComponentStatus::Unhealthy, "mock database down")
        };

        SystemHealth {
            status: system,
            components: vec![(
                "database".to_string(),
                HealthComponent {
                    status: component,
                    details: Some(details.to_string()),
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        if self.database_up {
            Ok("mock database".to_string())
        } else {
            Err("mock database down".to_string())
        }
    }
}
