//! Password hashing utilities

use bcrypt::{hash, verify};

/// Hash with the configured work factor (`security.bcrypt_cost`).
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hashed = hash_password_with_cost(password, 4).unwrap();

        assert!(verify_password(password, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password_with_cost("same_password", 4).unwrap();
        let second = hash_password_with_cost("same_password", 4).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_does_not_match() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
