//! Authentication for the hospital API
//!
//! Tokens are HS256 JWTs issued at login and checked by [`auth_middleware`]
//! on every protected route. Handlers read the caller from the
//! [`AuthenticatedUser`] request extension.

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "with-axum")]
use tracing::{debug, warn};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::user::Role;

pub mod logging;
pub mod password;
pub mod token;

// Role checks layered after the auth middleware
#[cfg(feature = "with-axum")]
pub mod authorize;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{SecurityError, TokenConfig, TokenService};

#[cfg(feature = "with-axum")]
use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};

/// Claims carried in issued tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Caller identity attached to authenticated requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: Role,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.sub.clone(),
            role: claims.role,
        }
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[cfg(feature = "with-axum")]
fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "success": false,
            "message": message,
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes
///
/// Rejects the request with 401 unless it carries a valid bearer token.
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let start_time = std::time::Instant::now();

    let failure = |details: &str| {
        log_auth_event(
            AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details(details)
                .with_resource(request_path.clone())
                .with_duration(start_time.elapsed().as_millis() as u64),
        );
    };

    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(auth_str) => auth_str,
            Err(_) => {
                warn!("Invalid Authorization header encoding");
                failure("Invalid Authorization header encoding");
                return unauthorized("Invalid authorization format");
            }
        },
        None => {
            debug!("Missing Authorization header");
            failure("Missing Authorization header");
            return unauthorized("Authorization header required");
        }
    };

    let Some(token) = bearer_token(auth_header) else {
        warn!("Authorization header does not contain Bearer token");
        failure("Authorization header does not contain Bearer token");
        return unauthorized("Invalid authorization format");
    };

    match tokens.validate_token(token) {
        Ok(claims) => {
            debug!("Token validated for user: {}", claims.sub);
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                    .with_resource(request_path.clone())
                    .with_duration(start_time.elapsed().as_millis() as u64),
            );

            req.extensions_mut().insert(AuthenticatedUser::from(&claims));
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(SecurityError::TokenExpired) => {
            warn!("Expired token presented for {}", request_path);
            failure("JWT token has expired");
            unauthorized("Token has expired")
        }
        Err(e) => {
            warn!("Token validation failed: {}", e);
            failure(&e.to_string());
            unauthorized("Invalid token")
        }
    }
}

#[cfg(all(test, feature = "with-axum"))]
mod tests {
    use super::*;
    use axum::{body::to_bytes, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn tokens() -> TokenService {
        TokenService::new(TokenConfig::new("middleware-test-secret"))
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthenticatedUser>| async move { user.username }),
            )
            .layer(middleware::from_fn_with_state(tokens(), auth_middleware))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "nurse.joy".to_string(),
            role: Role::Nurse,
            iss: "hospital-api".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"middleware-test-secret"),
        )
        .unwrap();

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Token has expired");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let token = tokens().generate_token("nurse.joy", Role::Nurse).unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"nurse.joy");
    }
}
