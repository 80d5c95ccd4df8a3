use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use hospital_client::models::{NewPatient, PatientUpdate};
use hospital_client::{ApiClient, ClientConfig, ClientError, FileTokenStore, MemoryTokenStore, RequestOptions, TokenStore};

fn client(server: &MockServer, store: Arc<dyn TokenStore>) -> ApiClient {
    ApiClient::new(format!("{}/api", server.uri()), store)
}

fn patient_json(id: &str, first_name: &str) -> Value {
    json!({
        "id": id,
        "firstName": first_name,
        "lastName": "Doe",
        "dob": "1990-01-01",
        "gender": "Male",
        "createdAt": "2024-03-01T10:00:00+00:00",
        "updatedAt": "2024-03-01T10:00:00+00:00"
    })
}

fn received_header(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[tokio::test]
async fn sends_bearer_token_when_stored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .and(header("authorization", "Bearer stored-token"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("stored-token")));
    let body: Value = api.fetch_api("/patients", RequestOptions::get()).await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let _: Value = api.fetch_api("/patients", RequestOptions::get()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(received_header(&requests[0], "authorization"), None);
    assert_eq!(
        received_header(&requests[0], "content-type").as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn wrapper_headers_override_caller_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("real")));
    let options = RequestOptions::post()
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer fake"))
        .header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("42"))
        .json(&json!({ "a": 1 }))
        .unwrap();
    let _: Value = api.fetch_api("/echo", options).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert_eq!(received_header(request, "content-type").as_deref(), Some("application/json"));
    assert_eq!(received_header(request, "authorization").as_deref(), Some("Bearer real"));
    assert_eq!(received_header(request, "x-request-id").as_deref(), Some("42"));
    assert_eq!(serde_json::from_slice::<Value>(&request.body).unwrap(), json!({ "a": 1 }));
}

#[tokio::test]
async fn caller_authorization_is_kept_without_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .and(header("authorization", "Bearer from-caller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let options = RequestOptions::get().header(AUTHORIZATION, HeaderValue::from_static("Bearer from-caller"));
    let _: Value = api.fetch_api("/patients", options).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "message": "Authorization header required" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));

    let err = api
        .fetch_api::<Value>("/patients", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    match err {
        ClientError::Status { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("Authorization header required"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }

    let err = api
        .fetch_api::<Value>("/broken", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/nothing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let body: Value = api.fetch_api("/nothing", RequestOptions::delete()).await.unwrap();
    assert_eq!(body, Value::Null);

    let unit: Option<String> = api.fetch_api("/nothing", RequestOptions::delete()).await.unwrap();
    assert_eq!(unit, None);
}

#[tokio::test]
async fn whitespace_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string(" \n\t"))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let body: Value = api.fetch_api("/blank", RequestOptions::get()).await.unwrap();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn unusable_stored_token_fails_without_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("broken\ntoken")));
    let err = api
        .fetch_api::<Value>("/patients", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidToken));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    let err = api
        .fetch_api::<Value>("/patients", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn login_persists_token_for_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": "password123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "token": "issued-token",
                "expiresIn": 259200,
                "user": {
                    "username": "admin",
                    "email": "admin@hospital.local",
                    "role": "admin",
                    "fullName": "System Administrator"
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/patients"))
        .and(header("authorization", "Bearer issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Patients retrieved successfully",
            "data": [patient_json("p-1", "John"), patient_json("p-2", "Jane")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token.json");
    let api = client(&server, Arc::new(FileTokenStore::new(&token_path)));

    let login = api.login("admin", "password123").await.unwrap();
    assert_eq!(login.user.full_name, "System Administrator");

    // A fresh client over the same file picks the token up
    let restarted = client(&server, Arc::new(FileTokenStore::new(&token_path)));
    assert!(restarted.is_logged_in());
    let patients = restarted.list_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[1].first_name, "Jane");

    restarted.logout().unwrap();
    assert!(!api.is_logged_in());
}

#[tokio::test]
async fn patient_helpers_use_expected_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/patients"))
        .and(body_json(json!({
            "firstName": "John",
            "lastName": "Doe",
            "dob": "1990-01-01",
            "gender": "Male"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Patient created successfully",
            "data": patient_json("p-1", "John")
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/patients/p-1"))
        .and(body_json(json!({ "firstName": "Johnny" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Patient updated successfully",
            "data": patient_json("p-1", "Johnny")
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/patients/p-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Patient deleted successfully" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/patients/p-1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "success": false, "message": "Patient not found" })),
        )
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("t")));

    let created = api
        .create_patient(&NewPatient {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            dob: "1990-01-01".to_string(),
            gender: "Male".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "p-1");

    let updated = api
        .update_patient(
            "p-1",
            &PatientUpdate {
                first_name: Some("Johnny".to_string()),
                ..PatientUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Johnny");

    api.delete_patient("p-1").await.unwrap();

    let err = api.get_patient("p-1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn health_targets_server_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::new()));
    assert_eq!(api.health().await.unwrap()["status"], "ok");
}

#[test]
fn default_config_points_at_local_api() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, "http://localhost:8080/api");
    assert_eq!(config.token_path, None);
}
