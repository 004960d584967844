//! Credential primitives: bcrypt hashes, bearer tokens, reset tokens.

pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{JwtConfig, JwtSessionIssuer};
pub use password::{hash_password_with_cost, verify_password};
pub use reset_token::{generate_reset_token, hash_reset_token, GeneratedResetToken};
