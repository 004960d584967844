use serde::Serialize;

use crate::domain::{DomainResult, User};

/// Credentials handed to a client after signing in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub trait SessionPort: Send + Sync {
    fn sign_in(&self, user: &User) -> DomainResult<SessionGrant>;
}
