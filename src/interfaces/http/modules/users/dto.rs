//! Account administration DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::application::ListAccountsQuery;

/// List accounts query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Substring matched against login, name and email
    pub q: Option<String>,
    /// Filter by role (member, author, editor, admin)
    pub role: Option<String>,
    /// Sort, e.g. `login asc` or `created_at desc,login asc`
    pub s: Option<String>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Screen width in pixels; picks the page size
    pub screen_size: Option<u32>,
}

impl From<ListUsersParams> for ListAccountsQuery {
    fn from(p: ListUsersParams) -> Self {
        Self {
            q: p.q,
            role: p.role,
            s: p.s,
            page: p.page,
            screen_size: p.screen_size,
        }
    }
}

/// Account form submission. Keys outside this set are ignored; `roles` only
/// counts for actors allowed to assign roles.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserFormRequest {
    pub user: UserFormFields,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserFormFields {
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    /// `male` or `female`
    pub gender: Option<String>,
    pub roles: Option<Vec<String>>,
    /// Left blank on update to keep the current password
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    /// The string `"1"` requests a welcome mail
    #[schema(value_type = Option<String>, example = "1")]
    pub send_credentials: Option<serde_json::Value>,
}
