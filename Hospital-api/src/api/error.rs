use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use hospital_domain::services::{PatientServiceError, UserServiceError};

use crate::entities::common::ErrorEnvelope;

/// Errors surfaced by handlers, rendered as the JSON envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Detail is logged, never returned to the caller
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Error processing request".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest("Invalid request format".to_string())
    }
}

impl From<PatientServiceError> for ApiError {
    fn from(err: PatientServiceError) -> Self {
        match err {
            PatientServiceError::Validation(msg) => ApiError::BadRequest(msg),
            PatientServiceError::NotFound(_) => ApiError::NotFound("Patient not found".to_string()),
            PatientServiceError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Validation(msg) => ApiError::BadRequest(msg),
            UserServiceError::Conflict(msg) => ApiError::Conflict(msg),
            UserServiceError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let (status, body) = render(ApiError::Internal("disk on fire".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Error processing request");
    }

    #[tokio::test]
    async fn test_invalid_credentials_maps_to_401() {
        let (status, body) = render(UserServiceError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[test]
    fn test_patient_errors_map_to_status() {
        let err: ApiError = PatientServiceError::NotFound("x".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: ApiError = PatientServiceError::Validation("bad dob".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
