//! Verify OTP Use Case (step 2 of the handshake)
//!
//! Exchanges a pending token plus a correct OTP code for a final token.
//! A final token submitted here is the wrong claim shape and is rejected.

use std::sync::Arc;

use crate::application::token::{Claims, TokenCodec};
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Verify OTP input
pub struct VerifyOtpInput {
    pub temp_token: String,
    pub otp_token: String,
}

/// Verify OTP output
pub struct VerifyOtpOutput {
    pub user: User,
    pub token: String,
}

/// Verify OTP use case
pub struct VerifyOtpUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S> VerifyOtpUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn execute(&self, input: VerifyOtpInput) -> AuthResult<VerifyOtpOutput> {
        let claims = self
            .codec
            .verify(&input.temp_token)
            .map_err(|_| AuthError::InvalidToken)?;

        // Only the pending shape completes this step
        let Claims::Pending(pending) = claims else {
            return Err(AuthError::InvalidToken);
        };

        // The account may have disappeared between step 1 and step 2
        let user_id = UserId::from_uuid(pending.id);
        let user = self
            .store
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let secret = user.otp_secret.as_ref().ok_or(AuthError::InvalidToken)?;

        if !secret.verify(&input.otp_token)? {
            tracing::warn!(user_id = %user.user_id, "OTP code rejected");
            return Err(AuthError::InvalidOtpCode);
        }

        let token = self.codec.issue_final(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.user_name,
            "OTP verified, login complete"
        );

        Ok(VerifyOtpOutput { user, token })
    }
}
