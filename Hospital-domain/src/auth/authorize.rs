use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::logging::{log_access_denied, log_auth_event, AuthEvent, AuthEventType};
use crate::auth::AuthenticatedUser;
use crate::entities::user::Role;

/// Middleware for role-based access control
///
/// Must run after `auth_middleware`. Callers whose role is not in
/// `allowed` get a 403 response.
pub async fn require_roles(allowed: &[Role], req: Request<Body>, next: Next) -> Response {
    let request_path = req.uri().path().to_string();

    let user = req.extensions().get::<AuthenticatedUser>().cloned();

    match user {
        Some(user) if allowed.contains(&user.role) => {
            debug!("User {} authorized for {}", user.username, request_path);
            next.run(req).await
        }
        Some(user) => {
            let required: Vec<String> = allowed.iter().map(|r| r.to_string()).collect();
            warn!(
                "User {} with role {} lacks required roles {:?} for {}",
                user.username, user.role, required, request_path
            );
            log_access_denied(&user.username, &request_path, &required);

            (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "message": "Insufficient permissions",
                })),
            )
                .into_response()
        }
        None => {
            warn!("No authenticated user in request extensions for path: {}", request_path);
            log_auth_event(
                AuthEvent::new(AuthEventType::AccessDenied, None, false)
                    .with_details("Authentication context missing")
                    .with_resource(request_path),
            );

            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Authentication required",
                })),
            )
                .into_response()
        }
    }
}

/// Middleware factory requiring a single role
///
/// ```ignore
/// let admin_routes = Router::new()
///     .route("/register", post(register))
///     .layer(middleware::from_fn(require_role(Role::Admin)));
/// ```
pub fn require_role(
    role: Role,
) -> impl Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |req, next| Box::pin(async move { require_roles(&[role], req, next).await })
}

/// Middleware factory accepting any of several roles
pub fn require_any_role(
    roles: &[Role],
) -> impl Fn(Request<Body>, Next) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let roles = roles.to_vec();
    move |req, next| {
        let roles = roles.clone();
        Box::pin(async move { require_roles(&roles, req, next).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app(user: Option<AuthenticatedUser>, guard: Router) -> Router {
        match user {
            Some(user) => guard.layer(Extension(user)),
            None => guard,
        }
    }

    fn admin_only() -> Router {
        Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_role(Role::Admin)))
    }

    async fn status_for(router: Router) -> StatusCode {
        router
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            username: "someone".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_matching_role_is_allowed() {
        assert_eq!(status_for(app(Some(user(Role::Admin)), admin_only())).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_role_is_forbidden() {
        assert_eq!(
            status_for(app(Some(user(Role::Doctor)), admin_only())).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        assert_eq!(status_for(app(None, admin_only())).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_any_role() {
        let clinical = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(middleware::from_fn(require_any_role(&[Role::Doctor, Role::Nurse])));

        assert_eq!(status_for(app(Some(user(Role::Nurse)), clinical.clone())).await, StatusCode::OK);
        assert_eq!(
            status_for(app(Some(user(Role::Patient)), clinical)).await,
            StatusCode::FORBIDDEN
        );
    }
}
