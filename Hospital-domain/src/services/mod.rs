// Domain services
// This module contains business logic implementations.
pub mod patient;
pub mod user;

use validator::ValidationErrors;

// Re-export service traits and factory functions
pub use patient::{create_default_patient_service, PatientService, PatientServiceError, PatientServiceTrait};
pub use user::{create_default_user_service, LoginOutcome, UserService, UserServiceError, UserServiceTrait};

/// Flatten validator errors into one message, fields in `order` first
pub(crate) fn validation_message(errors: &ValidationErrors, order: &[&str]) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().copied().collect();
    fields.sort_by_key(|field| {
        (
            order.iter().position(|o| o == field).unwrap_or(order.len()),
            *field,
        )
    });

    fields
        .into_iter()
        .filter_map(|field| field_errors.get(field).map(|errs| (field, errs)))
        .map(|(field, errs)| {
            errs.iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("invalid {}", field),
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
