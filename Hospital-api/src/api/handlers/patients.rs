use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use hospital_domain::entities::{CreatePatientRequest, Patient, UpdatePatientRequest};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::common::{ApiResponse, ErrorEnvelope, PatientEnvelope, PatientListEnvelope};

/// List all patients
#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Patients retrieved successfully", body = PatientListEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let patients = state.patients.list_patients().await?;
    info!("Returning {} patients", patients.len());
    Ok(Json(ApiResponse::ok("Patients retrieved successfully", patients)))
}

/// Get one patient
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = state.patients.get_patient(&id).await?;
    Ok(Json(ApiResponse::ok("Patient retrieved successfully", patient)))
}

/// Create a patient
#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "patients"
)]
#[instrument(skip(state, payload))]
pub async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    let Json(request) = payload?;
    let patient = state.patients.create_patient(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Patient created successfully", patient)),
    ))
}

/// Update some fields of a patient
#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientEnvelope),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "patients"
)]
#[instrument(skip(state, payload))]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let Json(request) = payload?;
    let patient = state.patients.update_patient(&id, request).await?;
    Ok(Json(ApiResponse::ok("Patient updated successfully", patient)))
}

/// Delete a patient
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient deleted", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.patients.delete_patient(&id).await?;
    Ok(Json(ApiResponse::message("Patient deleted successfully")))
}
