use std::env;
use std::path::PathBuf;

/// Base URL used when `API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix joined verbatim with each endpoint
    pub base_url: String,
    /// Where the token is persisted; in memory only when `None`
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token_path: None,
        }
    }
}

impl ClientConfig {
    /// Read `API_URL` and `HOSPITAL_TOKEN_PATH`
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("API_URL")
                .ok()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_path: env::var_os("HOSPITAL_TOKEN_PATH").map(PathBuf::from),
        }
    }
}
