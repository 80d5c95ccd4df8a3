use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hospital_domain::entities::{Patient, UserAccount};

use crate::entities::auth::LoginData;

/// Response envelope wrapping every successful payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    PatientEnvelope = ApiResponse<Patient>,
    PatientListEnvelope = ApiResponse<Vec<Patient>>,
    LoginEnvelope = ApiResponse<LoginData>,
    UserEnvelope = ApiResponse<UserAccount>
)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Error envelope; `success` is always false
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
