//! Password reset token generation
//!
//! The raw token only ever travels in the reset mail; the database keeps
//! its SHA-256 digest.

use rand::Rng;

/// A freshly generated reset token.
#[derive(Debug, Clone)]
pub struct GeneratedResetToken {
    /// Raw token, embedded in the reset URL
    pub token: String,
    /// Digest stored on the account
    pub token_hash: String,
}

/// Generate a random reset token (32 bytes = 64 hex chars).
pub fn generate_reset_token() -> GeneratedResetToken {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    let token = hex::encode(random_bytes);
    let token_hash = hash_reset_token(&token);
    GeneratedResetToken { token, token_hash }
}

/// Hash a reset token for storage using SHA-256
pub fn hash_reset_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
