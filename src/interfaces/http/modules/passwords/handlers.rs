//! Password reset handlers
//!
//! Mounted behind `require_secure_transport`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;

use super::dto::{EditPasswordParams, ResetPasswordBody, ResetRequestBody};
use crate::application::passwords::{ResetPasswordForm, ResetRequestForm};
use crate::application::PasswordResetService;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, DirectiveResponse, InvalidBody, RedirectBody,
};

#[derive(Clone)]
pub struct PasswordHandlerState {
    pub passwords: Arc<PasswordResetService>,
}

#[utoipa::path(
    get,
    path = "/admin/password/new",
    tag = "Passwords",
    responses(
        (status = 200, description = "Reset request form", body = ResetRequestForm),
        (status = 302, description = "Plaintext request moved to HTTPS")
    )
)]
pub async fn new_password(State(state): State<PasswordHandlerState>) -> DirectiveResponse {
    state.passwords.new_form().into()
}

#[utoipa::path(
    post,
    path = "/admin/password",
    tag = "Passwords",
    request_body = ResetRequestBody,
    responses(
        (status = 303, description = "Instructions sent if the address is known", body = RedirectBody),
        (status = 400, description = "Missing user parameter", body = ApiResponse<String>)
    )
)]
pub async fn create_password(
    State(state): State<PasswordHandlerState>,
    Json(payload): Json<Value>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.passwords.create(&payload).await?.into())
}

#[utoipa::path(
    get,
    path = "/admin/password/edit",
    tag = "Passwords",
    params(EditPasswordParams),
    responses(
        (status = 200, description = "New password form", body = ResetPasswordForm),
        (status = 303, description = "No token given", body = RedirectBody)
    )
)]
pub async fn edit_password(
    State(state): State<PasswordHandlerState>,
    Query(params): Query<EditPasswordParams>,
) -> DirectiveResponse {
    state
        .passwords
        .edit(params.reset_password_token.as_deref())
        .into()
}

#[utoipa::path(
    put,
    path = "/admin/password",
    tag = "Passwords",
    request_body = ResetPasswordBody,
    responses(
        (status = 303, description = "Password changed and signed in", body = RedirectBody),
        (status = 400, description = "Missing user parameter", body = ApiResponse<String>),
        (status = 422, description = "Bad token or password", body = InvalidBody)
    )
)]
pub async fn update_password(
    State(state): State<PasswordHandlerState>,
    Json(payload): Json<Value>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.passwords.update(&payload).await?.into())
}
