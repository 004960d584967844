//! Password reset DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EditPasswordParams {
    /// Token from the reset mail
    pub reset_password_token: Option<String>,
}

/// Reset request submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetRequestBody {
    pub user: ResetRequestFields,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetRequestFields {
    pub email: String,
}

/// New password submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordBody {
    pub user: ResetPasswordFields,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordFields {
    pub reset_password_token: String,
    pub password: String,
    pub password_confirmation: String,
}
