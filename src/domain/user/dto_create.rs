use super::{Gender, UserRole};

/// Insert payload. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub login: String,
    pub name: Option<String>,
    pub email: String,
    pub roles: Vec<UserRole>,
    pub gender: Option<Gender>,
    pub password_hash: String,
}
