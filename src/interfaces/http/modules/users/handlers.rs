//! Account administration handlers
//!
//! Thin wrappers over `AccountAdminService`. Create and update run the
//! welcome-mail step before answering.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::warn;

use super::dto::{ListUsersParams, UserFormRequest};
use crate::application::accounts::{AccountForm, AccountList};
use crate::application::{AccountAdminService, Submission};
use crate::domain::Actor;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, DirectiveResponse, InvalidBody, RedirectBody,
};

#[derive(Clone)]
pub struct UserHandlerState {
    pub accounts: Arc<AccountAdminService>,
}

async fn finish(state: &UserHandlerState, submission: Submission) -> DirectiveResponse {
    if let Err(e) = state.accounts.deliver_welcome(&submission).await {
        warn!(error = %e, "Welcome mail failed");
    }
    DirectiveResponse(submission.directive)
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "Account list", body = AccountList),
        (status = 403, description = "Forbidden", body = ApiResponse<String>),
        (status = 422, description = "Unknown role or sort field", body = ApiResponse<String>)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListUsersParams>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.accounts.list(params.into(), &actor).await?.into())
}

#[utoipa::path(
    get,
    path = "/admin/users/new",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Blank account form", body = AccountForm),
        (status = 403, description = "Forbidden", body = ApiResponse<String>)
    )
)]
pub async fn new_user(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.accounts.new_account(&actor).await?.into())
}

#[utoipa::path(
    get,
    path = "/admin/signup",
    tag = "Users",
    responses(
        (status = 200, description = "First-run signup form", body = AccountForm),
        (status = 303, description = "Already initialized", body = RedirectBody)
    )
)]
pub async fn signup(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.accounts.signup(&actor).await?.into())
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UserFormRequest,
    responses(
        (status = 303, description = "Account created", body = RedirectBody),
        (status = 400, description = "Missing user parameter", body = ApiResponse<String>),
        (status = 403, description = "Forbidden", body = ApiResponse<String>),
        (status = 422, description = "Form errors", body = InvalidBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<Value>,
) -> Result<DirectiveResponse, ApiError> {
    let submission = state.accounts.create(&payload, &actor).await?;
    Ok(finish(&state, submission).await)
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}/edit",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account form", body = AccountForm),
        (status = 403, description = "Forbidden", body = ApiResponse<String>),
        (status = 404, description = "Not found", body = ApiResponse<String>)
    )
)]
pub async fn edit_user(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.accounts.edit(&id, &actor).await?.into())
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Account ID")),
    request_body = UserFormRequest,
    responses(
        (status = 303, description = "Account updated", body = RedirectBody),
        (status = 403, description = "Forbidden", body = ApiResponse<String>),
        (status = 404, description = "Not found", body = ApiResponse<String>),
        (status = 422, description = "Form errors", body = InvalidBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<DirectiveResponse, ApiError> {
    let submission = state.accounts.update(&id, &payload, &actor).await?;
    Ok(finish(&state, submission).await)
}

#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 303, description = "Back to the list", body = RedirectBody),
        (status = 403, description = "Forbidden", body = ApiResponse<String>),
        (status = 404, description = "Not found", body = ApiResponse<String>)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<DirectiveResponse, ApiError> {
    Ok(state.accounts.destroy(&id, &actor).await?.into())
}
