//! Strong parameters for account forms.

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{DomainError, DomainResult, FieldErrors, Gender, UserRole};

const BASE_ATTRIBUTES: [&str; 7] = [
    "login",
    "name",
    "email",
    "gender",
    "password",
    "password_confirmation",
    "send_credentials",
];

/// Attribute names accepted from an account form. `roles` is only accepted
/// from actors allowed to assign roles.
pub fn permitted_attributes(can_update_role: bool) -> Vec<&'static str> {
    let mut attributes = BASE_ATTRIBUTES.to_vec();
    if can_update_role {
        attributes.push("roles");
    }
    attributes
}

/// Whitelisted, typed account parameters.
///
/// `None` means the key was not submitted (or was stripped).
#[derive(Debug, Clone, Default)]
pub struct AccountParams {
    pub login: Option<String>,
    pub name: Option<Option<String>>,
    pub email: Option<String>,
    pub gender: Option<Option<Gender>>,
    pub roles: Option<Vec<UserRole>>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    /// Kept verbatim; only the exact string `"1"` requests a welcome mail.
    pub send_credentials: Option<Value>,
    /// Type and enumeration problems found while reading the payload.
    pub errors: FieldErrors,
}

impl AccountParams {
    /// A password counts as submitted only when it is not blank.
    pub fn password_present(&self) -> bool {
        self.password
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// Forget the password pair, e.g. when an update leaves it blank.
    pub fn drop_password(&mut self) {
        self.password = None;
        self.password_confirmation = None;
    }
}

/// Extract the `user` object from `payload`, keeping only permitted keys.
pub fn permit(payload: &Value, can_update_role: bool) -> DomainResult<AccountParams> {
    let user = require_object(payload, "user")?;
    let allowed = permitted_attributes(can_update_role);

    let mut params = AccountParams::default();
    for (key, value) in user {
        if !allowed.contains(&key.as_str()) {
            debug!(parameter = %key, "Unpermitted parameter stripped");
            continue;
        }
        let errors = &mut params.errors;
        match key.as_str() {
            "login" => params.login = read_string(value, key, errors),
            "email" => params.email = read_string(value, key, errors),
            "name" => params.name = read_optional_string(value, key, errors),
            "password" => params.password = read_string(value, key, errors),
            "password_confirmation" => {
                params.password_confirmation = read_string(value, key, errors)
            }
            "gender" => params.gender = read_gender(value, errors),
            "roles" => params.roles = read_roles(value, errors),
            "send_credentials" => params.send_credentials = Some(value.clone()),
            _ => {}
        }
    }
    Ok(params)
}

/// `payload[key]` as a non-empty object, or `ParameterMissing`.
pub fn require_object<'a>(payload: &'a Value, key: &'static str) -> DomainResult<&'a Map<String, Value>> {
    payload
        .get(key)
        .and_then(Value::as_object)
        .filter(|o| !o.is_empty())
        .ok_or(DomainError::ParameterMissing(key))
}

fn read_string(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        _ => {
            errors.add(field, "must be a string");
            None
        }
    }
}

fn read_optional_string(value: &Value, field: &str, errors: &mut FieldErrors) -> Option<Option<String>> {
    match value {
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Null => Some(None),
        _ => {
            errors.add(field, "must be a string");
            None
        }
    }
}

fn read_gender(value: &Value, errors: &mut FieldErrors) -> Option<Option<Gender>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) if s.is_empty() => Some(None),
        Value::String(s) => match Gender::parse(s) {
            Some(gender) => Some(Some(gender)),
            None => {
                errors.add("gender", "is not included in the list");
                None
            }
        },
        _ => {
            errors.add("gender", "must be a string");
            None
        }
    }
}

fn read_roles(value: &Value, errors: &mut FieldErrors) -> Option<Vec<UserRole>> {
    let Value::Array(items) = value else {
        errors.add("roles", "must be a list");
        return None;
    };

    let mut roles = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            // Multi-selects submit a blank hidden entry
            Some("") => {}
            Some(s) => match UserRole::parse(s) {
                Some(role) if !roles.contains(&role) => roles.push(role),
                Some(_) => {}
                None => {
                    errors.add("roles", "is not included in the list");
                    return None;
                }
            },
            None => {
                errors.add("roles", "is not included in the list");
                return None;
            }
        }
    }
    Some(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_permitted_only_with_update_role() {
        assert!(permitted_attributes(true).contains(&"roles"));
        assert!(!permitted_attributes(false).contains(&"roles"));
        assert_eq!(permitted_attributes(false).len(), 7);
    }

    #[test]
    fn missing_user_key_is_parameter_missing() {
        assert!(matches!(
            permit(&json!({}), true),
            Err(DomainError::ParameterMissing("user"))
        ));
        assert!(matches!(
            permit(&json!({"user": "jane"}), true),
            Err(DomainError::ParameterMissing("user"))
        ));
    }

    #[test]
    fn strips_unknown_and_unauthorized_keys() {
        let payload = json!({"user": {
            "login": "jane",
            "admin": true,
            "roles": ["admin"],
            "password_hash": "x"
        }});
        let params = permit(&payload, false).unwrap();
        assert_eq!(params.login.as_deref(), Some("jane"));
        assert!(params.roles.is_none());
        assert!(params.errors.is_empty());
    }

    #[test]
    fn reads_roles_and_gender() {
        let payload = json!({"user": {"roles": ["", "editor", "admin"], "gender": "female"}});
        let params = permit(&payload, true).unwrap();
        assert_eq!(params.roles, Some(vec![UserRole::Editor, UserRole::Admin]));
        assert_eq!(params.gender, Some(Some(Gender::Female)));
    }

    #[test]
    fn rejects_wrong_types_and_unknown_values() {
        let payload = json!({"user": {
            "login": 42,
            "roles": ["owner"],
            "gender": "other"
        }});
        let params = permit(&payload, true).unwrap();
        assert_eq!(params.errors.get("login").unwrap(), &["must be a string".to_string()]);
        assert!(params.errors.contains("roles"));
        assert!(params.errors.contains("gender"));
        assert!(params.login.is_none());
    }

    #[test]
    fn blank_password_is_not_present() {
        let params = permit(&json!({"user": {"password": "   "}}), false).unwrap();
        assert!(!params.password_present());
        let params = permit(&json!({"user": {"password": "secret123"}}), false).unwrap();
        assert!(params.password_present());
    }

    #[test]
    fn send_credentials_kept_verbatim() {
        let params = permit(&json!({"user": {"send_credentials": 1}}), false).unwrap();
        assert_eq!(params.send_credentials, Some(json!(1)));
    }
}
