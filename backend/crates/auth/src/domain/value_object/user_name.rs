//! User Name Value Object
//!
//! Public handle used for login and display.
//!
//! ## Invariants
//! - Non-empty after trim + NFKC normalization
//! - At most 64 characters
//! - No internal whitespace
//!
//! Case is preserved for display (`original`); uniqueness checks use the
//! lowercase `canonical` form.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains whitespace
    ContainsWhitespace,
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Username is too long ({length} chars, maximum {max})")
            }
            Self::ContainsWhitespace => {
                write!(f, "Username cannot contain whitespace")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated, normalized user name
///
/// # Storage
/// - `original`: The user's input (trimmed, NFKC normalized, preserves case)
/// - `canonical`: Lowercase form for uniqueness checks
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    /// Original user input (preserves case)
    original: String,
    /// Canonical form (lowercase) for uniqueness
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input
    ///
    /// Applies normalization (NFKC, trim) and validates.
    /// Preserves case in original, stores lowercase in canonical.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize(input.as_ref());
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Get the original user name (preserves case)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Get the canonical (normalized, lowercase) user name
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from database values (assumes already validated)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_lowercase();
        Self {
            original,
            canonical,
        }
    }

    /// Normalize input string (trim and NFKC, preserve case)
    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    /// Validate the normalized user name
    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if name.chars().any(|c| c.is_whitespace()) {
            return Err(UserNameError::ContainsWhitespace);
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for UserName {
    type Error = UserNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}

// ============================================================================
// Tests
// ============================================================================
