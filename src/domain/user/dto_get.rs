use super::UserRole;

/// Sortable account columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Login,
    Name,
    Email,
    CreatedAt,
    LastLoginAt,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "login" => Some(Self::Login),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "created_at" => Some(Self::CreatedAt),
            "last_login_at" => Some(Self::LastLoginAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Name => "name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
            Self::LastLoginAt => "last_login_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Parse `"<field> <asc|desc>"`. A bare field sorts ascending.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let field = SortField::parse(parts.next()?)?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { field, direction })
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{} {}", self.field.as_str(), dir)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetUserDto {
    /// Substring matched against login, name and email.
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub sorts: Vec<SortOrder>,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sort_expressions() {
        assert_eq!(
            SortOrder::parse("login asc"),
            Some(SortOrder::asc(SortField::Login))
        );
        assert_eq!(
            SortOrder::parse("email DESC").map(|s| s.direction),
            Some(SortDirection::Desc)
        );
        assert_eq!(SortOrder::parse("name"), Some(SortOrder::asc(SortField::Name)));
        assert_eq!(SortOrder::parse("password_hash asc"), None);
        assert_eq!(SortOrder::parse("login sideways"), None);
        assert_eq!(SortOrder::parse(""), None);
    }
}
