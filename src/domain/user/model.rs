use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account role. Closed set; order is the order offered in forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Author,
    Editor,
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::Member, Self::Author, Self::Editor, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Author => "author",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "author" => Some(Self::Author),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Human-readable label used in select options.
    pub fn human_name(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Author => "Author",
            Self::Editor => "Editor",
            Self::Admin => "Administrator",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Member
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Self::Male, Self::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn human_name(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Serialize roles as a comma separated list (storage format).
pub fn roles_to_string(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(UserRole::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the storage format back. Unknown entries are skipped.
pub fn roles_from_str(s: &str) -> Vec<UserRole> {
    s.split(',')
        .map(str::trim)
        .filter_map(UserRole::parse)
        .collect()
}

/// User account
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<UserRole>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub reset_password_token: Option<String>,
    pub reset_password_sent_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown in confirmations: the full name, falling back to the login.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}
