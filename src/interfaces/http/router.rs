//! HTTP router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::accounts::{AccountDraft, AccountForm, AccountList, AccountSummary, PageInfo};
use crate::application::passwords::{ResetPasswordForm, ResetRequestForm};
use crate::application::{AccountAdminService, Flash, FlashKind, LoginService, PasswordResetService, View};
use crate::interfaces::http::common::{ApiResponse, InvalidBody, RedirectBody};
use crate::interfaces::http::middleware::{
    actor_middleware, require_secure_transport, AuthState, TransportPolicy,
};
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{auth, health, metrics, passwords, users};

/// Everything the routes need. Each handler extracts its own slice via
/// `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountAdminService>,
    pub passwords: Arc<PasswordResetService>,
    pub login: Arc<LoginService>,
    pub auth: AuthState,
    pub transport: TransportPolicy,
    pub health: health::HealthState,
    pub metrics: MetricsState,
}

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            accounts: Arc::clone(&s.accounts),
        }
    }
}

impl FromRef<AppState> for passwords::PasswordHandlerState {
    fn from_ref(s: &AppState) -> Self {
        passwords::PasswordHandlerState {
            passwords: Arc::clone(&s.passwords),
        }
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            login: Arc::clone(&s.login),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        s.metrics.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from /admin/login or a password reset"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        metrics::prometheus_metrics,
        // Auth
        auth::login,
        // Users
        users::list_users,
        users::new_user,
        users::signup,
        users::create_user,
        users::edit_user,
        users::update_user,
        users::delete_user,
        // Passwords
        passwords::new_password,
        passwords::create_password,
        passwords::edit_password,
        passwords::update_password,
    ),
    components(
        schemas(
            ApiResponse<String>,
            RedirectBody,
            InvalidBody,
            View,
            Flash,
            FlashKind,
            auth::LoginRequest,
            AccountList,
            AccountSummary,
            PageInfo,
            AccountForm,
            AccountDraft,
            users::UserFormRequest,
            users::UserFormFields,
            ResetRequestForm,
            ResetPasswordForm,
            passwords::ResetRequestBody,
            passwords::ResetRequestFields,
            passwords::ResetPasswordBody,
            passwords::ResetPasswordFields,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and Prometheus metrics"),
        (name = "Authentication", description = "Sign in and receive a bearer token"),
        (name = "Users", description = "Account administration and first-run signup"),
        (name = "Passwords", description = "Password reset by email token"),
    ),
    info(
        title = "CMS Accounts API",
        version = "0.1.0",
        description = "Administrative account management for the CMS back office"
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    // Account administration resolves the actor from the bearer token
    let user_routes = Router::new()
        .route(
            "/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/admin/users/new", get(users::new_user))
        .route("/admin/users/{id}/edit", get(users::edit_user))
        .route(
            "/admin/users/{id}",
            axum::routing::put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/admin/signup", get(users::signup))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            actor_middleware,
        ))
        .with_state(state.clone());

    // Password reset is only served over TLS when required
    let password_routes = Router::new()
        .route("/admin/password/new", get(passwords::new_password))
        .route(
            "/admin/password",
            post(passwords::create_password).put(passwords::update_password),
        )
        .route("/admin/password/edit", get(passwords::edit_password))
        .layer(middleware::from_fn_with_state(
            state.transport.clone(),
            require_secure_transport,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/admin/login", post(auth::login))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(user_routes)
        .merge(password_routes)
        .merge(public_routes)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::{AccountSettings, ResetSettings};
    use crate::domain::{
        CreateUserDto, NotificationError, NotificationPort, User, UserRepositoryInterface,
        UserRole,
    };
    use crate::infrastructure::crypto::jwt::create_token;
    use crate::infrastructure::crypto::hash_password_with_cost;
    use crate::infrastructure::{
        InMemoryUserRepository, JwtConfig, JwtSessionIssuer, LogMailer, RolePolicy,
    };
    use crate::interfaces::http::modules::request_id::REQUEST_ID_HEADER;

    struct TestApp {
        repo: Arc<InMemoryUserRepository>,
        jwt: JwtConfig,
        router: Router,
    }

    /// Notifier whose every delivery fails.
    struct BrokenMailer;

    #[async_trait]
    impl NotificationPort for BrokenMailer {
        async fn deliver_welcome(&self, user: &User) -> Result<(), NotificationError> {
            Err(NotificationError::Delivery {
                recipient: user.email.clone(),
                reason: "smtp relay down".into(),
            })
        }

        async fn deliver_reset_instructions(
            &self,
            user: &User,
            _reset_url: &str,
        ) -> Result<(), NotificationError> {
            Err(NotificationError::Delivery {
                recipient: user.email.clone(),
                reason: "smtp relay down".into(),
            })
        }
    }

    fn test_app(require_ssl: bool) -> TestApp {
        let mailer = Arc::new(LogMailer::new("no-reply@example.com", "https://cms.example.com"));
        test_app_with(require_ssl, mailer)
    }

    fn test_app_with(require_ssl: bool, mailer: Arc<dyn NotificationPort>) -> TestApp {
        let repo = Arc::new(InMemoryUserRepository::new());
        let jwt = JwtConfig {
            secret: "router-test-secret".into(),
            expiration_hours: 1,
            issuer: "cms-accounts".into(),
        };
        let policy = Arc::new(RolePolicy::new());
        let sessions = Arc::new(JwtSessionIssuer::new(jwt.clone()));

        let state = AppState {
            accounts: Arc::new(AccountAdminService::new(
                repo.clone(),
                policy.clone(),
                mailer.clone(),
                sessions.clone(),
                AccountSettings {
                    default_per_page: 25,
                    bcrypt_cost: 4,
                },
            )),
            passwords: Arc::new(PasswordResetService::new(
                repo.clone(),
                policy,
                mailer,
                sessions.clone(),
                ResetSettings {
                    base_url: "https://cms.example.com".into(),
                    reset_password_within_hours: 6,
                    bcrypt_cost: 4,
                },
            )),
            login: Arc::new(LoginService::new(repo.clone(), sessions)),
            auth: AuthState {
                jwt_config: jwt.clone(),
                users: repo.clone(),
            },
            transport: TransportPolicy { require_ssl },
            health: health::HealthState {
                db: None,
                started_at: Arc::new(Instant::now()),
            },
            metrics: MetricsState {
                handle: PrometheusBuilder::new().build_recorder().handle(),
            },
        };

        TestApp {
            repo,
            jwt,
            router: create_router(state),
        }
    }

    async fn seed_admin(app: &TestApp) -> (User, String) {
        seed_account(app, "root", vec![UserRole::Admin]).await
    }

    async fn seed_account(app: &TestApp, login: &str, roles: Vec<UserRole>) -> (User, String) {
        let user = app
            .repo
            .create_user(CreateUserDto {
                login: login.into(),
                name: None,
                email: format!("{}@example.com", login),
                roles,
                gender: None,
                password_hash: hash_password_with_cost("password123", 4).unwrap(),
            })
            .await
            .unwrap();
        let token = create_token(&user, &app.jwt).unwrap();
        (user, token)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn account_body(login: &str) -> Value {
        json!({
            "user": {
                "login": login,
                "email": format!("{}@example.com", login),
                "password": "password123",
                "password_confirmation": "password123"
            }
        })
    }

    #[tokio::test]
    async fn guest_list_is_forbidden() {
        let app = test_app(false);
        let response = app
            .router
            .oneshot(get_request("/admin/users", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn first_run_create_signs_in() {
        let app = test_app(false);
        let response = app
            .router
            .oneshot(json_request("POST", "/admin/users", None, account_body("founder")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/pages");
        let body = body_json(response).await;
        assert_eq!(body["redirect_to"], "/admin/pages");
        assert!(body["session"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(app.repo.get_user_by_login("founder").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn signup_after_first_account_redirects() {
        let app = test_app(false);
        seed_admin(&app).await;
        let response = app
            .router
            .oneshot(get_request("/admin/signup", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/dashboard");
    }

    #[tokio::test]
    async fn admin_lists_and_edits_accounts() {
        let app = test_app(false);
        let (admin, token) = seed_admin(&app).await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/admin/users?s=login%20desc", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["view"], "admin/users/index");
        assert_eq!(body["accounts"][0]["login"], "root");

        let response = app
            .router
            .clone()
            .oneshot(get_request(&format!("/admin/users/{}/edit", admin.id), Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .router
            .oneshot(get_request("/admin/users/missing/edit", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_create_renders_errors() {
        let app = test_app(false);
        let (_, token) = seed_admin(&app).await;
        let body = json!({ "user": { "login": "x", "email": "nope" } });
        let response = app
            .router
            .oneshot(json_request("POST", "/admin/users", Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["view"], "admin/users/new");
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn patch_updates_account() {
        let app = test_app(false);
        let (admin, token) = seed_admin(&app).await;
        let body = json!({ "user": { "name": "Root User" } });
        let response = app
            .router
            .oneshot(json_request(
                "PATCH",
                &format!("/admin/users/{}", admin.id),
                Some(&token),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let stored = app.repo.get_user_by_login("root").await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Root User"));
    }

    #[tokio::test]
    async fn login_returns_token() {
        let app = test_app(false);
        seed_admin(&app).await;
        let body = json!({ "login": "root@example.com", "password": "password123" });
        let response = app
            .router
            .clone()
            .oneshot(json_request("POST", "/admin/login", None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(body_json(response).await["session"]["token"].is_string());

        let body = json!({ "login": "root", "password": "wrong-password" });
        let response = app
            .router
            .oneshot(json_request("POST", "/admin/login", None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleted_account_token_loses_access() {
        let app = test_app(false);
        let (root, root_token) = seed_admin(&app).await;
        let (boss, boss_token) = seed_account(&app, "boss", vec![UserRole::Admin]).await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/admin/users/{}", root.id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", boss_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .router
            .clone()
            .oneshot(get_request("/admin/users", Some(&root_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/admin/users/{}", boss.id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", root_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(app.repo.get_user_by_id(&boss.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn demoted_admin_loses_admin_rights() {
        let app = test_app(false);
        let (root, root_token) = seed_admin(&app).await;
        let (_, boss_token) = seed_account(&app, "boss", vec![UserRole::Admin]).await;

        let body = json!({ "user": { "roles": ["member"] } });
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/admin/users/{}", root.id),
                Some(&boss_token),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .router
            .oneshot(get_request("/admin/users", Some(&root_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn failing_welcome_mail_keeps_redirect() {
        let app = test_app_with(false, Arc::new(BrokenMailer));
        let (_, token) = seed_admin(&app).await;
        let mut body = account_body("newbie");
        body["user"]["send_credentials"] = json!("1");

        let response = app
            .router
            .oneshot(json_request("POST", "/admin/users", Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/users");
        let body = body_json(response).await;
        assert_eq!(body["flash"]["kind"], "notice");
        assert_eq!(body["flash"]["message"], "User newbie successfully created.");
        assert!(app.repo.get_user_by_login("newbie").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let app = test_app(false);
        let response = app
            .router
            .oneshot(get_request("/admin/users", Some("not-a-jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn password_routes_require_tls_when_configured() {
        let app = test_app(true);
        let request = Request::builder()
            .uri("/admin/password/new")
            .header(header::HOST, "cms.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://cms.example.com/admin/password/new"
        );

        let request = Request::builder()
            .uri("/admin/password/new")
            .header(header::HOST, "cms.example.com")
            .header("x-forwarded-proto", "https")
            .body(Body::empty())
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["view"], "admin/passwords/new");
    }

    #[tokio::test]
    async fn reset_request_without_user_param_is_bad_request() {
        let app = test_app(false);
        let response = app
            .router
            .oneshot(json_request("POST", "/admin/password", None, json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_memory_storage() {
        let app = test_app(false);
        let response = app.router.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["storage"]["kind"], "memory");
    }
}
