use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Date format used for dates of birth
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// A patient record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a patient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,

    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,

    #[validate(length(min = 1, max = 32, message = "gender is required"))]
    pub gender: String,
}

/// Request payload for a partial patient update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[validate(length(min = 1, max = 100, message = "first name must not be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "last name must not be empty"))]
    pub last_name: Option<String>,

    pub dob: Option<String>,

    #[validate(length(min = 1, max = 32, message = "gender must not be empty"))]
    pub gender: Option<String>,
}

impl UpdatePatientRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.dob.is_none() && self.gender.is_none()
    }
}

/// Parse a date of birth, rejecting dates in the future
pub fn parse_dob(dob: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(dob, DOB_FORMAT)
        .map_err(|_| format!("dob must be a date in YYYY-MM-DD format, got '{}'", dob))?;

    if date > Utc::now().date_naive() {
        return Err("dob must not be in the future".to_string());
    }

    Ok(date)
}
