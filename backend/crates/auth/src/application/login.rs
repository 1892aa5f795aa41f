//! Login Use Case (step 1 of the handshake)
//!
//! Verifies the password. Users without an enrolled second factor get a
//! final token immediately; enrolled users get a short-lived pending token
//! and must complete the OTP step.
//!
//! Unknown username and wrong password produce the same error so responses
//! never reveal whether an account exists.

use std::sync::Arc;

use crate::application::token::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::UserName;
use crate::error::{AuthError, AuthResult};
use platform::password::ClearTextPassword;

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Login output
pub enum LoginOutput {
    /// No second factor enrolled; handshake complete
    Complete { user: User, token: String },
    /// Second factor enrolled; client must submit an OTP code with this
    /// pending token. No usable final token is issued here.
    OtpRequired { temp_token: String },
}

/// Login use case
pub struct LoginUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S> LoginUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // Input that cannot be a valid username behaves like an unknown user
        let user_name =
            UserName::new(&input.username).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .store
            .find_by_username(&user_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let clear =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let password = user.password.clone();
        let verified = tokio::task::spawn_blocking(move || password.verify(&clear))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        if user.has_otp() {
            let temp_token = self.codec.issue_pending(&user)?;

            tracing::info!(
                user_id = %user.user_id,
                username = %user.user_name,
                "Password verified, OTP pending"
            );

            Ok(LoginOutput::OtpRequired { temp_token })
        } else {
            let token = self.codec.issue_final(&user)?;

            tracing::info!(
                user_id = %user.user_id,
                username = %user.user_name,
                "User logged in"
            );

            Ok(LoginOutput::Complete { user, token })
        }
    }
}
