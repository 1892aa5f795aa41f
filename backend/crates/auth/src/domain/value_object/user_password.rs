//! User Password Value Object
//!
//! Domain wrapper around the platform hashing primitives. The PHC string
//! produced by Argon2id embeds its own salt, so the hash column is the only
//! credential material persisted.

use platform::password::{ClearTextPassword, HashedPassword, PasswordHashError};

/// Stored password credential (Argon2id PHC string)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a clear text password
    ///
    /// Argon2id is deliberately slow; callers on a request path should run
    /// this on a blocking worker.
    pub fn from_clear_text(password: &ClearTextPassword) -> Result<Self, PasswordHashError> {
        Ok(Self(password.hash()?))
    }

    /// Create from PHC string (from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        Ok(Self(HashedPassword::from_phc_string(s)?))
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a candidate password; false on mismatch, never an error
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        self.0.verify(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let clear = ClearTextPassword::new("pw123".to_string()).unwrap();
        let password = UserPassword::from_clear_text(&clear).unwrap();

        assert!(password.verify(&clear));

        let wrong = ClearTextPassword::new("pw124".to_string()).unwrap();
        assert!(!password.verify(&wrong));
    }

    #[test]
    fn test_phc_roundtrip() {
        let clear = ClearTextPassword::new("pw123".to_string()).unwrap();
        let password = UserPassword::from_clear_text(&clear).unwrap();

        let restored = UserPassword::from_phc_string(password.as_phc_string()).unwrap();
        assert!(restored.verify(&clear));
    }
}
