//! User Entity
//!
//! The single durable entity of the auth subsystem: identity, credentials
//! and second-factor enrollment in one record.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, otp_secret::OtpSecret, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// User name (unique, for login and display)
    pub user_name: UserName,
    /// Email address (unique)
    pub email: Email,
    /// Argon2id password hash
    pub password: UserPassword,
    /// TOTP secret; `None` means no second factor enrolled
    pub otp_secret: Option<OtpSecret>,
    /// Profile bio (owned by the profile surface, readable here)
    pub bio: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(
        user_name: UserName,
        email: Email,
        password: UserPassword,
        otp_secret: Option<OtpSecret>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password,
            otp_secret,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a second factor is enrolled
    ///
    /// The secret is stable once set: it is reused for every future OTP
    /// verification until explicitly rotated.
    pub fn has_otp(&self) -> bool {
        self.otp_secret.is_some()
    }

    /// Enroll a TOTP secret
    pub fn enroll_otp(&mut self, secret: OtpSecret) {
        self.otp_secret = Some(secret);
        self.updated_at = Utc::now();
    }
}
