//! OTP Secret Value Object
//!
//! Wraps a TOTP shared secret for second-factor verification.
//! Google Authenticator compatible settings: SHA-1, 6 digits, 30s period.
//!
//! Codes are accepted within ±2 steps (±60 seconds) of the current step to
//! absorb clock drift between the server and the authenticator device.
//! Widening this window trades security for usability and must stay small.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

/// TOTP configuration constants
const OTP_DIGITS: usize = 6;
const OTP_STEP: u64 = 30;
const OTP_SKEW: u8 = 2;

/// TOTP secret for second-factor authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl OtpSecret {
    /// Generate a new random TOTP secret (160 bits)
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from database)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid OTP secret: {:?}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    /// Create a TOTP instance for this secret
    fn to_totp(&self, account_name: &str, issuer: Option<String>) -> AppResult<TOTP> {
        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            OTP_DIGITS,
            OTP_SKEW,
            OTP_STEP,
            secret
                .to_bytes()
                .map_err(|e| AppError::internal(format!("Invalid OTP secret: {:?}", e)))?,
            issuer,
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Get the otpauth:// provisioning URL for authenticator apps
    pub fn provisioning_url(&self, account_name: &str, issuer: &str) -> AppResult<String> {
        let totp = self.to_totp(account_name, Some(issuer.to_string()))?;
        Ok(totp.get_url())
    }

    /// Verify a code against the current wall-clock time
    pub fn verify(&self, code: &str) -> AppResult<bool> {
        let totp = self.to_totp("account", None)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    /// Verify a code at an explicit unix timestamp (deterministic for tests)
    pub fn verify_at(&self, code: &str, unix_time: u64) -> AppResult<bool> {
        let totp = self.to_totp("account", None)?;
        Ok(totp.check(code, unix_time))
    }

    /// Generate the code for an explicit unix timestamp (for testing)
    #[cfg(test)]
    pub fn generate_at(&self, unix_time: u64) -> AppResult<String> {
        let totp = self.to_totp("account", None)?;
        Ok(totp.generate(unix_time))
    }

    /// Generate the current code (for testing)
    #[cfg(test)]
    pub fn generate_current(&self) -> AppResult<String> {
        let totp = self.to_totp("account", None)?;
        totp.generate_current()
            .map_err(|e| AppError::internal(format!("Failed to generate OTP: {}", e)))
    }
}
