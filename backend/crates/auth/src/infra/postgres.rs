//! PostgreSQL User Store

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{
    email::Email, otp_secret::OtpSecret, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    user_id,
    username,
    username_canonical,
    email,
    password_hash,
    otp_secret,
    bio,
    created_at,
    updated_at
"#;

impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                username_canonical,
                email,
                password_hash,
                otp_secret,
                bio,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.otp_secret.as_ref().map(|s| s.as_base32()))
        .bind(user.bio.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The unique constraints are the authoritative duplicate guard;
            // a raced duplicate insert must surface as a conflict.
            Err(e) if is_unique_violation(&e) => Err(AuthError::DuplicateUser),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username_canonical = $1"
        ))
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username_canonical = $1 OR email = $2 LIMIT 1"
        ))
        .bind(user_name.canonical())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn update_otp_secret(&self, user_id: &UserId, secret: &OtpSecret) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                otp_secret = $2,
                updated_at = $3
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(secret.as_base32())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Whether an sqlx error is a PostgreSQL unique-constraint violation (23505)
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

// ============================================================================
// Row Mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    #[allow(dead_code)]
    username_canonical: String,
    email: String,
    password_hash: String,
    otp_secret: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let otp_secret = self
            .otp_secret
            .map(OtpSecret::from_base32)
            .transpose()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password: UserPassword::from_phc_string(self.password_hash)
                .map_err(|e| AuthError::Internal(e.to_string()))?,
            otp_secret,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
