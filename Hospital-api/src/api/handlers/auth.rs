use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    Extension,
};
use tracing::{info, instrument};

use hospital_domain::auth::AuthenticatedUser;
use hospital_domain::entities::{LoginRequest, RegisterRequest, UserAccount};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::auth::LoginData;
use crate::entities::common::{ApiResponse, ErrorEnvelope, LoginEnvelope, UserEnvelope};

/// Exchange a username and password for a token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginEnvelope),
        (status = 400, description = "Malformed body or missing fields", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let Json(request) = payload?;
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required".to_string()));
    }

    let outcome = state.users.login(request).await?;

    Ok(Json(ApiResponse::ok(
        "Login successful",
        LoginData {
            token: outcome.token,
            expires_in: state.tokens.expires_in(),
            user: outcome.user,
        },
    )))
}

/// Create a user account; admin only
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserEnvelope),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope),
        (status = 409, description = "Username already exists", body = ErrorEnvelope),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserAccount>>), ApiError> {
    let Json(request) = payload?;
    let account = state.users.register(request).await?;
    info!("{} registered user {} as {}", caller.username, account.username, account.role);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User registered successfully", account)),
    ))
}
