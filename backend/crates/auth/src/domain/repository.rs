//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    email::Email, otp_secret::OtpSecret, user_id::UserId, user_name::UserName,
};
use crate::error::AuthResult;

/// User store trait
///
/// Username/email uniqueness is enforced by the store itself (unique
/// constraints); `insert` on a duplicate must surface as a conflict, not an
/// internal error. The pre-insert lookup callers do is an early exit only.
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Insert a new user
    async fn insert(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by user name (canonical form)
    async fn find_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find a user holding either this user name or this email
    async fn find_by_username_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<Option<User>>;

    /// Persist an OTP secret for a user
    async fn update_otp_secret(&self, user_id: &UserId, secret: &OtpSecret) -> AuthResult<()>;
}
