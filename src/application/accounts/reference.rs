//! Select options for account forms.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Gender, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelectOption {
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = String)]
    pub value: &'static str,
}

pub fn role_options() -> Vec<SelectOption> {
    UserRole::ALL
        .iter()
        .map(|r| SelectOption {
            label: r.human_name(),
            value: r.as_str(),
        })
        .collect()
}

pub fn gender_options() -> Vec<SelectOption> {
    Gender::ALL
        .iter()
        .map(|g| SelectOption {
            label: g.human_name(),
            value: g.as_str(),
        })
        .collect()
}
