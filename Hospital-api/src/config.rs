use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default port, as served by the original backend
pub const DEFAULT_PORT: u16 = 8080;

/// Read and write timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `APP_ENV`, reported by the health endpoint
    pub environment: String,
    /// Run the seeder before serving
    pub seed_on_startup: bool,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            seed_on_startup: true,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("PORT", port))?;
        }

        if let Ok(environment) = env::var("APP_ENV") {
            config.environment = environment;
        }

        if let Ok(seed) = env::var("SEED_ON_STARTUP") {
            config.seed_on_startup =
                parse_bool(&seed).ok_or(ConfigError::InvalidValue("SEED_ON_STARTUP", seed))?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
