use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::debug;

use hospital_domain::auth::{auth_middleware, authorize::require_role};
use hospital_domain::entities::Role;

use crate::api::handlers::{auth, health, patients};
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    debug!("Creating application router");

    // Patient routes need any authenticated user
    let patient_routes = Router::new()
        .route("/patients", get(patients::list_patients).post(patients::create_patient))
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware));

    // Authentication must happen before authorization, so it is layered last
    let admin_routes = Router::new()
        .route("/register", post(auth::register))
        .layer(middleware::from_fn(require_role(Role::Admin)))
        .layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware));

    let api_routes = Router::new()
        .route("/login", post(auth::login))
        .merge(patient_routes)
        .merge(admin_routes);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(configure_swagger_routes());

    debug!("Routes configured");

    health::initialize_server_start_time();

    configure_security(app, config.request_timeout)
}

/// Request tracing, timeout, CORS and security headers
pub fn configure_security(app: Router, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(security_headers)
        .layer(TraceLayer::new_for_http())
}
