//! Domain layer health check functionality

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use hospital_data::database::DatabasePool;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// `Err` when the database cannot answer a query
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health checks against the SQLite pool
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(description) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(description),
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            }
        };

        let overall_status = match db_component.status {
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Healthy => SystemStatus::Healthy,
        };

        SystemHealth {
            status: overall_status,
            components: vec![("database".to_string(), db_component)].into_iter().collect(),
        }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        self.pool
            .ping()
            .map(|_| self.pool.describe())
            .map_err(|e| format!("Database connection error: {}", e))
    }
}
