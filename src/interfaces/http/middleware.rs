//! Authentication and transport middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use tracing::{debug, error};

use super::common::ApiResponse;
use crate::domain::{Actor, UserRepositoryInterface};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    UnknownAccount,
    Unavailable,
}

/// State for the actor middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    /// Accounts are reloaded on every request so that deletions and role
    /// changes apply to tokens already issued.
    pub users: Arc<dyn UserRepositoryInterface>,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Resolve the [`Actor`] for a request and store it in the extensions.
///
/// No `Authorization` header means a guest; the policy decides what a
/// guest may do. A header that is present but unusable is rejected, as is
/// a token whose account no longer exists. Roles come from the stored
/// account, not from the claims.
pub async fn actor_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let actor = match auth_header {
        None => Actor::guest(),
        Some(auth_header) => {
            let Some(token) = extract_token(auth_header) else {
                return auth_error_response(AuthError::InvalidToken);
            };
            let claims = match verify_token(token, &auth_state.jwt_config) {
                Ok(claims) if claims.is_expired() => {
                    return auth_error_response(AuthError::ExpiredToken)
                }
                Ok(claims) => claims,
                Err(e) => {
                    debug!(error = %e, "Rejected bearer token");
                    return auth_error_response(AuthError::InvalidToken);
                }
            };
            match auth_state.users.get_user_by_id(&claims.sub).await {
                Ok(Some(user)) => Actor::from_user(&user),
                Ok(None) => {
                    debug!(user_id = %claims.sub, "Bearer token for a missing account");
                    return auth_error_response(AuthError::UnknownAccount);
                }
                Err(e) => {
                    error!(error = %e, "Failed to load account for bearer token");
                    return auth_error_response(AuthError::Unavailable);
                }
            }
        }
    };

    request.extensions_mut().insert(actor);
    next.run(request).await
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::UnknownAccount => (StatusCode::UNAUTHORIZED, "Account no longer exists"),
        AuthError::Unavailable => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not load the signed-in account",
        ),
    };

    (
        status,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

// ── Secure transport ────────────────────────────────────────────

/// State for [`require_secure_transport`]
#[derive(Clone, Debug)]
pub struct TransportPolicy {
    pub require_ssl: bool,
}

/// Check if the request arrived over HTTPS, directly or via a proxy
fn is_https(req: &Request<Body>) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }

    req.headers()
        .get("x-forwarded-proto")
        .and_then(|proto| proto.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

/// HTTPS equivalent of the request URL, preserving path and query
fn https_url(req: &Request<Body>) -> Option<String> {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))?;
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Some(format!("https://{}{}", host, path_and_query))
}

/// Redirect (302) plaintext requests to HTTPS when `require_ssl` is on.
pub async fn require_secure_transport(
    State(policy): State<TransportPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !policy.require_ssl || is_https(&request) {
        return next.run(request).await;
    }

    let location = https_url(&request).and_then(|url| HeaderValue::from_str(&url).ok());
    match location {
        Some(location) => {
            debug!(uri = %request.uri(), "Redirecting plaintext request to HTTPS");
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Missing Host header")),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use crate::domain::{roles_to_string, CreateUserDto, UpdateUserDto, User, UserRole};
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::InMemoryUserRepository;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "cms-accounts".into(),
        }
    }

    fn actor_app_with(users: Arc<InMemoryUserRepository>) -> Router {
        async fn whoami(Extension(actor): Extension<Actor>) -> String {
            match actor.login {
                Some(login) => format!("{}:{}", login, roles_to_string(&actor.roles)),
                None => "guest".into(),
            }
        }
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(
                AuthState {
                    jwt_config: jwt_config(),
                    users,
                },
                actor_middleware,
            ))
    }

    fn actor_app() -> Router {
        actor_app_with(Arc::new(InMemoryUserRepository::new()))
    }

    async fn seed(users: &InMemoryUserRepository, roles: Vec<UserRole>) -> User {
        users
            .create_user(CreateUserDto {
                login: "jane".into(),
                name: None,
                email: "jane@example.com".into(),
                roles,
                gender: None,
                password_hash: String::new(),
            })
            .await
            .unwrap()
    }

    fn whoami_request(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/whoami")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn transport_app(require_ssl: bool) -> Router {
        Router::new()
            .route("/admin/password/new", get(|| async { "form" }))
            .layer(middleware::from_fn_with_state(
                TransportPolicy { require_ssl },
                require_secure_transport,
            ))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_guest() {
        let req = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
        let response = actor_app().oneshot(req).await.unwrap();
        assert_eq!(body_text(response).await, "guest");
    }

    #[tokio::test]
    async fn bearer_token_becomes_actor() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed(&users, vec![UserRole::Admin]).await;
        let token = create_token(&user, &jwt_config()).unwrap();
        let response = actor_app_with(users).oneshot(whoami_request(&token)).await.unwrap();
        assert_eq!(body_text(response).await, "jane:admin");
    }

    #[tokio::test]
    async fn roles_come_from_stored_account() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed(&users, vec![UserRole::Admin]).await;
        let token = create_token(&user, &jwt_config()).unwrap();
        users
            .update_user(
                &user.id,
                UpdateUserDto {
                    roles: Some(vec![UserRole::Member]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let response = actor_app_with(users).oneshot(whoami_request(&token)).await.unwrap();
        assert_eq!(body_text(response).await, "jane:member");
    }

    #[tokio::test]
    async fn token_for_deleted_account_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed(&users, vec![UserRole::Admin]).await;
        let token = create_token(&user, &jwt_config()).unwrap();
        users.delete_user(&user.id).await.unwrap();

        let response = actor_app_with(users).oneshot(whoami_request(&token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let req = Request::builder()
            .uri("/whoami")
            .header("authorization", "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let response = actor_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn plaintext_redirects_to_https() {
        let req = Request::builder()
            .uri("/admin/password/new?x=1")
            .header("host", "cms.example.com")
            .body(Body::empty())
            .unwrap();
        let response = transport_app(true).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://cms.example.com/admin/password/new?x=1"
        );
    }

    #[tokio::test]
    async fn forwarded_https_passes() {
        let req = Request::builder()
            .uri("/admin/password/new")
            .header("host", "cms.example.com")
            .header("x-forwarded-proto", "HTTPS")
            .body(Body::empty())
            .unwrap();
        let response = transport_app(true).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn guard_off_passes_plaintext() {
        let req = Request::builder()
            .uri("/admin/password/new")
            .body(Body::empty())
            .unwrap();
        let response = transport_app(false).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
