//! OTP Setup Use Case
//!
//! Returns the authenticated user's TOTP secret and provisioning URL,
//! generating and persisting a secret first if none exists. Idempotent:
//! repeated calls never rotate an existing secret.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::OtpSecret;
use crate::error::AuthResult;

/// OTP setup output
pub struct OtpSetupOutput {
    pub secret: String,
    pub otpauth_url: String,
}

/// OTP setup use case
pub struct OtpSetupUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> OtpSetupUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, user: &User) -> AuthResult<OtpSetupOutput> {
        let secret = match &user.otp_secret {
            Some(existing) => existing.clone(),
            None => {
                let secret = OtpSecret::generate();
                self.store.update_otp_secret(&user.user_id, &secret).await?;

                tracing::info!(user_id = %user.user_id, "OTP secret provisioned");

                secret
            }
        };

        let otpauth_url =
            secret.provisioning_url(user.email.as_str(), &self.config.otp_issuer)?;

        Ok(OtpSetupOutput {
            secret: secret.as_base32().to_string(),
            otpauth_url,
        })
    }
}
