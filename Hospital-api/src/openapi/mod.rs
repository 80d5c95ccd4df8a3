use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::register,
        crate::api::handlers::patients::list_patients,
        crate::api::handlers::patients::get_patient,
        crate::api::handlers::patients::create_patient,
        crate::api::handlers::patients::update_patient,
        crate::api::handlers::patients::delete_patient,
    ),
    components(
        schemas(
            crate::entities::common::ErrorEnvelope,
            crate::entities::common::PatientEnvelope,
            crate::entities::common::PatientListEnvelope,
            crate::entities::common::LoginEnvelope,
            crate::entities::common::UserEnvelope,
            crate::entities::auth::LoginData,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,
            hospital_domain::entities::Patient,
            hospital_domain::entities::CreatePatientRequest,
            hospital_domain::entities::UpdatePatientRequest,
            hospital_domain::entities::LoginRequest,
            hospital_domain::entities::RegisterRequest,
            hospital_domain::entities::UserAccount,
            hospital_domain::entities::UserSummary,
            hospital_domain::entities::Role,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Login and account registration"),
        (name = "patients", description = "Patient records")
    ),
    info(
        title = "Hospital API",
        version = "0.1.0",
        description = "Patient records and staff accounts for the hospital",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
