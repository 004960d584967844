use super::{Gender, UserRole};

/// Partial update. `None` leaves a column as it is; in particular a `None`
/// `password_hash` never touches the stored credential.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub login: Option<String>,
    pub name: Option<Option<String>>,
    pub email: Option<String>,
    pub roles: Option<Vec<UserRole>>,
    pub gender: Option<Option<Gender>>,
    pub password_hash: Option<String>,
}
