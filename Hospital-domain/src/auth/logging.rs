use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Successful password login
    Login,
    /// Rejected login attempt
    FailedLogin,
    /// New account created
    Registration,
    /// Bearer token checked by the middleware
    TokenValidation,
    /// Authenticated caller lacked the required role
    AccessDenied,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
        }
    }
}

/// Authentication audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// Username, when known
    pub username: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path the event relates to
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds
    pub duration_ms: Option<u64>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, username: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            username: username.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Emit an authentication event on the `auth_audit` target
pub fn log_auth_event(event: AuthEvent) {
    let username = event.username.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("");

    if event.success {
        info!(
            target: "auth_audit",
            event = %event.event_type,
            username,
            resource,
            duration_ms = event.duration_ms,
            "{}",
            details
        );
    } else {
        warn!(
            target: "auth_audit",
            event = %event.event_type,
            username,
            resource,
            duration_ms = event.duration_ms,
            "{}",
            details
        );
    }
}

pub fn log_successful_login(username: &str, duration_ms: u64) {
    log_auth_event(
        AuthEvent::new(AuthEventType::Login, Some(username), true)
            .with_details("Login successful")
            .with_duration(duration_ms),
    );
}

pub fn log_failed_login(username: &str, reason: &str) {
    log_auth_event(AuthEvent::new(AuthEventType::FailedLogin, Some(username), false).with_details(reason));
}

pub fn log_registration(username: &str, role: &str) {
    log_auth_event(
        AuthEvent::new(AuthEventType::Registration, Some(username), true)
            .with_details(format!("Registered with role {}", role)),
    );
}

/// Log an access denied event
pub fn log_access_denied(username: &str, resource: &str, required_roles: &[String]) {
    let details = format!("Required roles: {}", required_roles.join(", "));

    log_auth_event(
        AuthEvent::new(AuthEventType::AccessDenied, Some(username), false)
            .with_resource(resource)
            .with_details(details),
    );
}
