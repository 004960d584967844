//! Capability checks.
//!
//! Handlers never evaluate policy themselves: they ask an
//! [`AuthorizationPort`] whether an [`Actor`] may perform an [`Action`]
//! on a [`Resource`].

use crate::domain::{User, UserRole};

/// The party performing a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<String>,
    pub login: Option<String>,
    pub roles: Vec<UserRole>,
}

impl Actor {
    /// Unauthenticated visitor.
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn signed_in(id: impl Into<String>, login: impl Into<String>, roles: Vec<UserRole>) -> Self {
        Self {
            id: Some(id.into()),
            login: Some(login.into()),
            roles,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self::signed_in(user.id.clone(), user.login.clone(), user.roles.clone())
    }

    pub fn is_guest(&self) -> bool {
        self.id.is_none()
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Index,
    New,
    Create,
    Edit,
    Update,
    Destroy,
    /// Assign roles to an account.
    UpdateRole,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::New => "new",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Update => "update",
            Self::Destroy => "destroy",
            Self::UpdateRole => "update_role",
        }
    }
}

/// What an action targets: the account class, one loaded account, or the
/// admin dashboard.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Users,
    User(&'a User),
    AdminDashboard,
}

impl Resource<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Users | Self::User(_) => "user",
            Self::AdminDashboard => "admin_dashboard",
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::User(u) => Some(u.id.as_str()),
            _ => None,
        }
    }
}

pub trait AuthorizationPort: Send + Sync {
    fn allowed(&self, actor: &Actor, action: Action, resource: Resource<'_>) -> bool;
}
