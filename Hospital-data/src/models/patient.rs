use serde::{Deserialize, Serialize};

/// Storage model for a patient document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier (UUID string)
    pub id: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Date of birth as `YYYY-MM-DD`
    pub dob: String,

    /// Gender as entered
    pub gender: String,

    /// RFC 3339 creation timestamp
    pub created_at: String,

    /// RFC 3339 last update timestamp
    pub updated_at: String,
}

/// Input data for inserting a new patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub gender: String,
}

/// Partial update of a patient; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

impl PatientChanges {
    /// Apply the changes to a stored patient
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(first_name) = &self.first_name {
            patient.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            patient.last_name = last_name.clone();
        }
        if let Some(dob) = &self.dob {
            patient.dob = dob.clone();
        }
        if let Some(gender) = &self.gender {
            patient.gender = gender.clone();
        }
    }
}
