//! Register Use Case
//!
//! Creates a new user account. Every new account gets a TOTP secret at
//! registration time, returned alongside the token so the client can enroll
//! an authenticator immediately.

use std::sync::Arc;

use crate::application::token::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{Email, OtpSecret, UserName, UserPassword};
use crate::error::{AuthError, AuthResult};
use platform::password::ClearTextPassword;

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register output
pub struct RegisterOutput {
    pub user: User,
    pub token: String,
    pub otp_secret: String,
}

/// Register use case
pub struct RegisterUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S> RegisterUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let user_name =
            UserName::new(input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(input.email)?;

        // Early exit; the store's unique constraints remain the
        // authoritative guard against a check-then-insert race.
        if self
            .store
            .find_by_username_or_email(&user_name, &email)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateUser);
        }

        let clear = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        // Argon2id is CPU-bound and slow; keep it off the request dispatcher.
        let password = tokio::task::spawn_blocking(move || UserPassword::from_clear_text(&clear))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let otp_secret = OtpSecret::generate();
        let user = User::new(user_name, email, password, Some(otp_secret.clone()));

        self.store.insert(&user).await?;

        let token = self.codec.issue_final(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.user_name,
            "User registered"
        );

        Ok(RegisterOutput {
            user,
            token,
            otp_secret: otp_secret.as_base32().to_string(),
        })
    }
}
