use validator::Validate;

use crate::domain::{FieldErrors, UserRole};

/// Attribute values an account would have after a create or update.
#[derive(Debug, Validate)]
pub struct AccountCandidate {
    #[validate(length(min = 3, max = 255, message = "must be between 3 and 255 characters"))]
    pub login: String,
    #[validate(email(message = "is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub roles: Vec<UserRole>,
}

/// A submitted password pair.
#[derive(Debug, Validate)]
pub struct PasswordCandidate {
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
    pub password_confirmation: Option<String>,
}

impl AccountCandidate {
    pub fn errors(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        }
    }
}

impl PasswordCandidate {
    pub fn errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };
        if self
            .password_confirmation
            .as_deref()
            .is_some_and(|confirmation| confirmation != self.password)
        {
            errors.add("password_confirmation", "doesn't match Password");
        }
        errors
    }
}

/// Password rules. `required` turns a missing or blank password into an error.
pub fn password_errors(
    password: Option<&str>,
    confirmation: Option<&str>,
    required: bool,
) -> FieldErrors {
    match password.filter(|p| !p.trim().is_empty()) {
        Some(password) => PasswordCandidate {
            password: password.to_string(),
            password_confirmation: confirmation.map(str::to_string),
        }
        .errors(),
        None if required => {
            let mut errors = FieldErrors::new();
            errors.add("password", "can't be blank");
            errors
        }
        None => FieldErrors::new(),
    }
}
