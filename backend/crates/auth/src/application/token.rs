//! Session Tokens
//!
//! Signed, self-contained bearer tokens (HS256 JWT) carrying one of two
//! claim shapes:
//! - `Final` - fully authenticated, 24h TTL, accepted by the bearer guard
//! - `Pending` - issued after the password check for users with an enrolled
//!   second factor, 5min TTL, accepted only by the OTP verification step
//!
//! The variant is decided solely by the signed payload shape: a pending
//! payload carries the `step` marker, a final payload carries `email`.
//! No external state is consulted.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed structure, or expired.
    /// Deliberately opaque: the failure reason is never exposed.
    #[error("Invalid or expired token")]
    Invalid,

    /// Signing failed (misconfiguration, never a client fault)
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Marker value for the pending variant's `step` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingStep {
    #[serde(rename = "otp_pending")]
    OtpPending,
}

/// Claims of a fully-authenticated token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalClaims {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Expiry as unix timestamp (seconds)
    pub exp: i64,
}

/// Claims of a pending-OTP token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingClaims {
    pub id: Uuid,
    pub username: String,
    pub step: PendingStep,
    /// Expiry as unix timestamp (seconds)
    pub exp: i64,
}

/// Tagged union of the two claim shapes
///
/// Untagged on the wire; disambiguation is structural. `Pending` is tried
/// first: its required `step` marker never appears in a final payload, and
/// a pending payload lacks the `email` that `Final` requires, so each
/// payload matches exactly one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Claims {
    Pending(PendingClaims),
    Final(FinalClaims),
}

impl Claims {
    /// User id carried by either variant
    pub fn user_id(&self) -> Uuid {
        match self {
            Claims::Pending(c) => c.id,
            Claims::Final(c) => c.id,
        }
    }
}

/// Signs and verifies session tokens
///
/// Built once at startup from [`AuthConfig`]; the keys never change for the
/// lifetime of the process.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_final_secs: i64,
    ttl_pending_secs: i64,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The 5-minute pending window is exact: no expiry leeway.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            ttl_final_secs: config.token_ttl_final_secs(),
            ttl_pending_secs: config.token_ttl_pending_secs(),
        }
    }

    /// Sign arbitrary claims (expiry must already be set)
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a fully-authenticated token for a user (24h TTL)
    pub fn issue_final(&self, user: &User) -> Result<String, TokenError> {
        let claims = Claims::Final(FinalClaims {
            id: *user.user_id.as_uuid(),
            username: user.user_name.original().to_string(),
            email: user.email.as_str().to_string(),
            exp: Utc::now().timestamp() + self.ttl_final_secs,
        });
        self.sign(&claims)
    }

    /// Issue a pending-OTP token for a user (5min TTL)
    pub fn issue_pending(&self, user: &User) -> Result<String, TokenError> {
        let claims = Claims::Pending(PendingClaims {
            id: *user.user_id.as_uuid(),
            username: user.user_name.original().to_string(),
            step: PendingStep::OtpPending,
            exp: Utc::now().timestamp() + self.ttl_pending_secs,
        });
        self.sign(&claims)
    }

    /// Verify a token and recover its claims
    ///
    /// All failures (signature, structure, expiry) collapse into the opaque
    /// [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{Email, UserName, UserPassword};
    use platform::password::ClearTextPassword;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("test-secret"))
    }

    fn sample_user() -> User {
        let clear = ClearTextPassword::new("pw123".to_string()).unwrap();
        User::new(
            UserName::new("alice").unwrap(),
            Email::new("alice@x.com").unwrap(),
            UserPassword::from_clear_text(&clear).unwrap(),
            None,
        )
    }

    #[test]
    fn test_final_token_roundtrip() {
        let codec = codec();
        let user = sample_user();
        let token = codec.issue_final(&user).unwrap();

        match codec.verify(&token).unwrap() {
            Claims::Final(claims) => {
                assert_eq!(claims.id, *user.user_id.as_uuid());
                assert_eq!(claims.username, "alice");
                assert_eq!(claims.email, "alice@x.com");
            }
            Claims::Pending(_) => panic!("final token decoded as pending"),
        }
    }

    #[test]
    fn test_pending_token_roundtrip() {
        let codec = codec();
        let user = sample_user();
        let token = codec.issue_pending(&user).unwrap();

        match codec.verify(&token).unwrap() {
            Claims::Pending(claims) => {
                assert_eq!(claims.id, *user.user_id.as_uuid());
                assert_eq!(claims.step, PendingStep::OtpPending);
            }
            Claims::Final(_) => panic!("pending token decoded as final"),
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let user = sample_user();
        let token = codec().issue_final(&user).unwrap();

        let other = TokenCodec::new(&AuthConfig::new("other-secret"));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let claims = Claims::Pending(PendingClaims {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            step: PendingStep::OtpPending,
            exp: Utc::now().timestamp() - 10,
        });
        let token = codec.sign(&claims).unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            codec().verify("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_step_serializes_as_marker_string() {
        let claims = PendingClaims {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            step: PendingStep::OtpPending,
            exp: 0,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["step"], "otp_pending");
    }
}
