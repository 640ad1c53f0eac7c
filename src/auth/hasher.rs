//! Password hashing

use sha2::{Digest, Sha256};

/// Salted SHA-256 password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    salt: String,
}

impl PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hex digest of `password || salt`
    pub fn hash(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(self.salt.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check a password against a stored hash
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        self.hash(password) == hash
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").field("salt", &"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hasher = PasswordHasher::new("salt");
        let hash = hasher.hash("secret");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify() {
        let hasher = PasswordHasher::new("salt");
        let hash = hasher.hash("secret");

        assert!(hasher.verify("secret", &hash));
        assert!(!hasher.verify("Secret", &hash));
    }

    #[test]
    fn test_salt_changes_hash() {
        let a = PasswordHasher::new("one").hash("secret");
        let b = PasswordHasher::new("two").hash("secret");
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_hides_salt() {
        let hasher = PasswordHasher::new("very-secret-salt");
        assert!(!format!("{:?}", hasher).contains("very-secret-salt"));
    }
}
