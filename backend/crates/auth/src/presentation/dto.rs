//! API DTOs (Data Transfer Objects)
//!
//! Request fields are `Option<String>` so that absent fields surface as a
//! 400 with a named field instead of an extractor-level rejection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::user::User;

// ============================================================================
// User Body
// ============================================================================

/// User profile as rendered in responses
#[derive(Debug, Clone, Serialize)]
pub struct UserBody {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub has_otp: bool,
    pub bio: Option<String>,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: *user.user_id.as_uuid(),
            username: user.user_name.original().to_string(),
            email: user.email.as_str().to_string(),
            has_otp: user.has_otp(),
            bio: user.bio.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Newly registered user, identity fields only
///
/// The enrollment state is implied by the accompanying `otp_secret` and the
/// profile has no content yet, so neither is echoed here.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUserBody {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for RegisteredUserBody {
    fn from(user: &User) -> Self {
        Self {
            id: *user.user_id.as_uuid(),
            username: user.user_name.original().to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}

/// Register response (201)
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user: RegisteredUserBody,
    pub token: String,
    /// Base32 secret so the client can enroll an authenticator immediately
    pub otp_secret: String,
}

// ============================================================================
// Login
// ============================================================================

/// Login request (step 1)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response (step 1)
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    /// No second factor enrolled; handshake complete
    Complete {
        success: bool,
        token: String,
        user: UserBody,
    },
    /// Second factor required; no usable final token included
    OtpRequired {
        success: bool,
        requires_otp: bool,
        temp_token: String,
        message: String,
    },
}

/// Verify OTP request (step 2)
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub temp_token: Option<String>,
    pub otp_token: Option<String>,
}

/// Verify OTP response (step 2)
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub token: String,
    pub user: UserBody,
}

/// Logout response
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// OTP Enrollment
// ============================================================================

/// OTP setup response
#[derive(Debug, Clone, Serialize)]
pub struct OtpSetupResponse {
    /// Base32 secret for manual entry
    pub secret: String,
    /// otpauth:// URL for authenticator apps
    pub otpauth_url: String,
}

/// OTP status response
#[derive(Debug, Clone, Serialize)]
pub struct OtpStatusResponse {
    pub otp_enabled: bool,
}

// ============================================================================
// Tests
// ============================================================================
