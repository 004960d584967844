//! View models handed to the interface layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::params::AccountParams;
use super::reference::{gender_options, role_options, SelectOption};
use crate::domain::{Gender, User, UserRole};
use crate::shared::PaginatedResult;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountSummary {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub display_name: String,
    pub email: String,
    #[schema(value_type = Vec<String>)]
    pub roles: Vec<UserRole>,
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            login: user.login.clone(),
            name: user.name.clone(),
            display_name: user.display_name().to_string(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            gender: user.gender,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountList {
    pub accounts: Vec<AccountSummary>,
    pub pagination: PageInfo,
    /// Effective sort, e.g. `["login asc"]`.
    pub sort: Vec<String>,
    pub q: Option<String>,
    pub role: Option<String>,
}

impl AccountList {
    pub fn new(
        page: PaginatedResult<User>,
        sort: Vec<String>,
        q: Option<String>,
        role: Option<String>,
    ) -> Self {
        Self {
            accounts: page.items.iter().map(AccountSummary::from).collect(),
            pagination: PageInfo {
                page: page.page,
                per_page: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
            sort,
            q,
            role,
        }
    }
}

/// Form field values. Passwords are never echoed back.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AccountDraft {
    pub id: Option<String>,
    pub login: String,
    pub name: Option<String>,
    pub email: String,
    #[schema(value_type = Vec<String>)]
    pub roles: Vec<UserRole>,
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
    #[schema(value_type = Object)]
    pub send_credentials: Value,
}

impl AccountDraft {
    /// Blank form for a new account.
    pub fn blank() -> Self {
        Self {
            roles: vec![UserRole::Member],
            send_credentials: Value::Bool(true),
            ..Default::default()
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            login: user.login.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            gender: user.gender,
            send_credentials: Value::Null,
        }
    }

    /// Overlay submitted parameters.
    pub fn apply(mut self, params: &AccountParams) -> Self {
        if let Some(login) = &params.login {
            self.login = login.clone();
        }
        if let Some(name) = &params.name {
            self.name = name.clone();
        }
        if let Some(email) = &params.email {
            self.email = email.clone();
        }
        if let Some(roles) = &params.roles {
            self.roles = roles.clone();
        }
        if let Some(gender) = params.gender {
            self.gender = gender;
        }
        if let Some(flag) = &params.send_credentials {
            self.send_credentials = flag.clone();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountForm {
    pub account: AccountDraft,
    /// Only offered to actors who may assign roles.
    pub roles: Option<Vec<SelectOption>>,
    pub genders: Vec<SelectOption>,
}

impl AccountForm {
    pub fn new(account: AccountDraft, can_update_role: bool) -> Self {
        Self {
            account,
            roles: can_update_role.then(role_options),
            genders: gender_options(),
        }
    }
}
