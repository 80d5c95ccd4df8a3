use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use hospital_api::{create_app, AppConfig, AppState};
use hospital_data::models::user::NewUser;
use hospital_data::repository::UserRepositoryTrait;
use hospital_domain::auth::{hash_password, TokenConfig, TokenService};
use hospital_domain::database::DatabasePool;
use hospital_domain::entities::Role;
use hospital_domain::seed::{seed_database, SeedConfig};
use hospital_domain::testing::{in_memory_patient_service, in_memory_user_service, MockHealthService};

const SECRET: &str = "api-test-secret";

async fn seeded_state() -> AppState {
    let pool = DatabasePool::in_memory().unwrap();
    seed_database(&pool, SeedConfig::default()).await.unwrap();
    AppState::from_pool(pool, TokenService::new(TokenConfig::new(SECRET)), "test")
}

async fn test_app() -> Router {
    create_app(seeded_state().await, &AppConfig::default())
}

fn tokens() -> TokenService {
    TokenService::new(TokenConfig::new(SECRET))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login_as_admin(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "admin", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn login_returns_token_and_user_summary() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "admin", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["user"]["fullName"], "System Administrator");
    assert_eq!(body["data"]["expiresIn"], 72 * 3600);

    let claims = tokens()
        .validate_token(body["data"]["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_bad_bodies() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "admin", "password": "password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "success": false, "message": "Invalid credentials" }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "nobody", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = send(&app, Method::POST, "/api/login", None, Some(json!({ "username": "admin" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username and password are required");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Invalid request format");
}

#[tokio::test]
async fn patients_require_a_valid_token() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let mut token = login_as_admin(&app).await;
    token.push('x');
    let (status, _) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = TokenService::new(TokenConfig::new("some-other-secret"))
        .generate_token("admin", Role::Admin)
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/patients", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn seeded_patients_are_listed() {
    let app = test_app().await;
    let token = login_as_admin(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let patients = body["data"].as_array().unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0]["firstName"], "John");
    assert_eq!(patients[0]["dob"], "1990-01-01");
    assert_eq!(patients[0]["gender"], "Male");
    assert_eq!(patients[1]["firstName"], "Jane");
    assert_eq!(patients[1]["dob"], "1995-02-01");
}

#[tokio::test]
async fn patient_crud_round_trip() {
    let app = test_app().await;
    let token = tokens().generate_token("nurse.joy", Role::Nurse).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(&token),
        Some(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dob": "1815-12-10",
            "gender": "Female"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/patients/{}", id);

    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lastName"], "Lovelace");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "lastName": "King" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lastName"], "King");
    assert_eq!(body["data"]["firstName"], "Ada");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Patient not found");
}

#[tokio::test]
async fn invalid_patient_is_rejected() {
    let app = test_app().await;
    let token = tokens().generate_token("dr.who", Role::Doctor).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(&token),
        Some(json!({
            "firstName": "Bad",
            "lastName": "Date",
            "dob": "10/12/1815",
            "gender": "Male"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn register_is_admin_only() {
    let app = test_app().await;
    let registration = json!({
        "username": "dr.house",
        "password": "vicodin",
        "email": "house@hospital.local",
        "firstName": "Gregory",
        "lastName": "House",
        "role": "doctor"
    });

    let (status, _) = send(&app, Method::POST, "/api/register", None, Some(registration.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let doctor = tokens().generate_token("dr.cuddy", Role::Doctor).unwrap();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        Some(&doctor),
        Some(registration.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let admin = login_as_admin(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        Some(&admin),
        Some(registration.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["role"], "doctor");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = send(&app, Method::POST, "/api/register", Some(&admin), Some(registration)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "dr.house", "password": "vicodin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_validation_errors_are_400() {
    let app = test_app().await;
    let admin = login_as_admin(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        Some(&admin),
        Some(json!({
            "username": "x",
            "password": "secret1",
            "email": "x@hospital.local",
            "firstName": "X",
            "lastName": "Y",
            "role": "nurse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username must be at least 3 characters long");
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
    assert_eq!(body["environment"], "test");

    let mut state = seeded_state().await;
    state.health = Arc::new(MockHealthService::new(false));
    let app = create_app(state, &AppConfig::default());
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["components"]["database"]["status"], "error");
}

#[tokio::test]
async fn router_runs_on_in_memory_services() {
    let (users, user_repository) = in_memory_user_service(tokens());
    user_repository
        .create(NewUser {
            username: "dr.house".to_string(),
            password_hash: hash_password("vicodin42").unwrap(),
            email: "house@hospital.local".to_string(),
            first_name: "Gregory".to_string(),
            last_name: "House".to_string(),
            role: "doctor".to_string(),
        })
        .await
        .unwrap();

    let state = AppState {
        patients: Arc::new(in_memory_patient_service()),
        users: Arc::new(users),
        health: Arc::new(MockHealthService::default()),
        tokens: tokens(),
        environment: "test".to_string(),
    };
    let app = create_app(state, &AppConfig::default());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "dr.house", "password": "vicodin42" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "doctor");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/patients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
}
