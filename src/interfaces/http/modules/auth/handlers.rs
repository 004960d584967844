//! Sign-in handler

use std::sync::Arc;

use axum::extract::State;

use super::dto::LoginRequest;
use crate::application::LoginService;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, DirectiveResponse, RedirectBody, ValidatedJson,
};

#[derive(Clone)]
pub struct AuthHandlerState {
    pub login: Arc<LoginService>,
}

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in; body carries the bearer token", body = RedirectBody),
        (status = 401, description = "Invalid credentials", body = ApiResponse<String>),
        (status = 422, description = "Missing login or password", body = ApiResponse<String>)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<DirectiveResponse, ApiError> {
    let directive = state
        .login
        .login(request.login.trim(), &request.password)
        .await?;
    Ok(directive.into())
}
