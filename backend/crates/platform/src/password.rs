//! Password Hashing and Verification
//!
//! Salted password handling built on Argon2id:
//! - Memory-hard hashing (OWASP recommended parameters)
//! - Zeroization of cleartext material
//! - Constant-time comparison delegated to the hashing primitive
//!
//! The PHC string produced by [`ClearTextPassword::hash`] embeds the salt,
//! so nothing but the hash itself needs to be stored.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Error Types
// ============================================================================

/// Password input errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordInputError {
    /// Password is empty or contains only whitespace
    #[error("Password cannot be empty")]
    Empty,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Securely erased from memory when dropped. Does not implement `Clone`
/// to prevent accidental copies; Debug output is redacted.
///
/// Input is NFKC-normalized before hashing so that the same password typed
/// through different input methods verifies consistently. The only input
/// rule is non-emptiness; length and composition policies are left to the
/// callers that own the registration contract.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password.
    ///
    /// Normalizes with NFKC and rejects empty/whitespace-only input.
    pub fn new(raw: String) -> Result<Self, PasswordInputError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordInputError::Empty);
        }

        Ok(Self(normalized))
    }

    /// Get the password as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id
    ///
    /// ## Returns
    /// PHC-formatted hash string wrapped in `HashedPassword`. The salt is
    /// freshly generated and embedded in the PHC string.
    pub fn hash(&self) -> Result<HashedPassword, PasswordHashError> {
        // Random 128-bit salt
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(self.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string includes the algorithm identifier, version, parameters,
/// salt and hash, so it is the only value that needs persisting.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();

        // Validate it's a valid PHC string
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// Returns false (never an error) on mismatch. Argon2 uses
    /// constant-time comparison internally.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
