//! Application Configuration
//!
//! Configuration for the Auth application layer. The token signing secret is
//! loaded once at process start and threaded into `TokenCodec`; nothing
//! re-reads the environment per request. Rotating the secret invalidates
//! every outstanding token.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for token signing (HS256)
    pub token_secret: String,
    /// TTL for fully-authenticated tokens (24 hours)
    pub token_ttl_final: Duration,
    /// TTL for pending-OTP tokens issued mid-login (5 minutes)
    pub token_ttl_pending: Duration,
    /// Issuer name shown in authenticator apps
    pub otp_issuer: String,
}

impl AuthConfig {
    /// Create config with an explicit signing secret
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl_final: Duration::from_secs(24 * 3600),
            token_ttl_pending: Duration::from_secs(5 * 60),
            otp_issuer: "SocialApp".to_string(),
        }
    }

    /// Create config with a random signing secret (for development/tests)
    pub fn with_random_secret() -> Self {
        use rand::Rng;
        let secret: String = rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();
        Self::new(secret)
    }

    /// Set the OTP issuer name
    pub fn with_otp_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.otp_issuer = issuer.into();
        self
    }

    /// Get token TTL for final tokens in seconds
    pub fn token_ttl_final_secs(&self) -> i64 {
        self.token_ttl_final.as_secs() as i64
    }

    /// Get token TTL for pending tokens in seconds
    pub fn token_ttl_pending_secs(&self) -> i64 {
        self.token_ttl_pending.as_secs() as i64
    }
}
