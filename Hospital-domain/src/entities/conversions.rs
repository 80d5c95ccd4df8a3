use chrono::{DateTime, Utc};

use crate::entities::patient::{CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::entities::user::{Role, UserAccount};
use hospital_data::models::patient as data_patient;
use hospital_data::models::user as data_user;

// Conversion functions between domain entities and data models,
// named convert_to_[target_layer]_[model_name]

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid stored timestamp: {}", value))
}

pub fn convert_to_domain_patient(data: data_patient::Patient) -> Result<Patient, String> {
    Ok(Patient {
        created_at: parse_timestamp(&data.created_at)?,
        updated_at: parse_timestamp(&data.updated_at)?,
        id: data.id,
        first_name: data.first_name,
        last_name: data.last_name,
        dob: data.dob,
        gender: data.gender,
    })
}

/// Names are stored trimmed
pub fn convert_to_data_new_patient(request: &CreatePatientRequest) -> data_patient::NewPatient {
    data_patient::NewPatient {
        first_name: request.first_name.trim().to_string(),
        last_name: request.last_name.trim().to_string(),
        dob: request.dob.clone(),
        gender: request.gender.trim().to_string(),
    }
}

pub fn convert_to_data_patient_changes(request: &UpdatePatientRequest) -> data_patient::PatientChanges {
    data_patient::PatientChanges {
        first_name: request.first_name.as_deref().map(|s| s.trim().to_string()),
        last_name: request.last_name.as_deref().map(|s| s.trim().to_string()),
        dob: request.dob.clone(),
        gender: request.gender.as_deref().map(|s| s.trim().to_string()),
    }
}

/// Drops the password hash
pub fn convert_to_domain_user(data: data_user::User) -> Result<UserAccount, String> {
    Ok(UserAccount {
        role: data.role.parse::<Role>()?,
        created_at: parse_timestamp(&data.created_at)?,
        updated_at: parse_timestamp(&data.updated_at)?,
        id: data.id,
        username: data.username,
        email: data.email,
        first_name: data.first_name,
        last_name: data.last_name,
    })
}
