//! Use-case flow tests over an in-memory user store.

use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue, header};

use crate::application::config::AuthConfig;
use crate::application::token::{Claims, TokenCodec};
use crate::application::{
    LoginInput, LoginOutput, LoginUseCase, OtpSetupUseCase, RegisterInput, RegisterUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{Email, OtpSecret, UserId, UserName, UserPassword};
use crate::error::{AuthError, AuthResult};
use crate::presentation::middleware::authenticate_bearer;
use platform::password::ClearTextPassword;

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone, Default)]
struct MemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        let taken = users.iter().any(|u| {
            u.user_name.canonical() == user.user_name.canonical()
                || u.email.as_str() == user.email.as_str()
        });
        if taken {
            return Err(AuthError::DuplicateUser);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| &u.user_id == user_id).cloned())
    }

    async fn find_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.user_name.canonical() == user_name.canonical())
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| {
                u.user_name.canonical() == user_name.canonical() || u.email.as_str() == email.as_str()
            })
            .cloned())
    }

    async fn update_otp_secret(&self, user_id: &UserId, secret: &OtpSecret) -> AuthResult<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| &u.user_id == user_id) {
            user.enroll_otp(secret.clone());
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct TestCtx {
    store: Arc<MemoryUserStore>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

fn ctx() -> TestCtx {
    let config = AuthConfig::new("test-signing-secret");
    TestCtx {
        store: Arc::new(MemoryUserStore::default()),
        codec: Arc::new(TokenCodec::new(&config)),
        config: Arc::new(config),
    }
}

async fn register_alice(ctx: &TestCtx) -> crate::application::RegisterOutput {
    RegisterUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(RegisterInput {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "pw123".to_string(),
        })
        .await
        .unwrap()
}

/// Insert a user directly, bypassing registration (so no OTP secret)
async fn insert_user_without_otp(ctx: &TestCtx, username: &str, email: &str, password: &str) -> User {
    let clear = ClearTextPassword::new(password.to_string()).unwrap();
    let user = User::new(
        UserName::new(username).unwrap(),
        Email::new(email).unwrap(),
        UserPassword::from_clear_text(&clear).unwrap(),
        None,
    );
    ctx.store.insert(&user).await.unwrap();
    user
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_returns_final_token_and_secret() {
    let ctx = ctx();
    let output = register_alice(&ctx).await;

    assert!(!output.otp_secret.is_empty());
    assert!(output.user.has_otp());

    match ctx.codec.verify(&output.token).unwrap() {
        Claims::Final(claims) => {
            assert_eq!(claims.id, *output.user.user_id.as_uuid());
            assert_eq!(claims.username, "alice");
            assert_eq!(claims.email, "alice@x.com");
        }
        Claims::Pending(_) => panic!("registration issued a pending token"),
    }
}

#[tokio::test]
async fn register_duplicate_username_conflicts() {
    let ctx = ctx();
    register_alice(&ctx).await;

    let result = RegisterUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(RegisterInput {
            username: "alice".to_string(),
            email: "other@x.com".to_string(),
            password: "pw456".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::DuplicateUser)));
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let ctx = ctx();
    register_alice(&ctx).await;

    let result = RegisterUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(RegisterInput {
            username: "bob".to_string(),
            email: "alice@x.com".to_string(),
            password: "pw456".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::DuplicateUser)));
}

#[tokio::test]
async fn register_duplicate_username_case_insensitive() {
    let ctx = ctx();
    register_alice(&ctx).await;

    let result = RegisterUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(RegisterInput {
            username: "ALICE".to_string(),
            email: "other@x.com".to_string(),
            password: "pw456".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::DuplicateUser)));
}

// ============================================================================
// Login step 1
// ============================================================================

#[tokio::test]
async fn login_unknown_user_and_wrong_password_look_the_same() {
    let ctx = ctx();
    insert_user_without_otp(&ctx, "bob", "bob@x.com", "correct").await;

    let use_case = LoginUseCase::new(ctx.store.clone(), ctx.codec.clone());

    let unknown = use_case
        .execute(LoginInput {
            username: "nobody".to_string(),
            password: "whatever".to_string(),
        })
        .await;
    let wrong_password = use_case
        .execute(LoginInput {
            username: "bob".to_string(),
            password: "incorrect".to_string(),
        })
        .await;

    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn login_without_otp_completes_immediately() {
    let ctx = ctx();
    let user = insert_user_without_otp(&ctx, "bob", "bob@x.com", "pw123").await;

    let output = LoginUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(LoginInput {
            username: "bob".to_string(),
            password: "pw123".to_string(),
        })
        .await
        .unwrap();

    match output {
        LoginOutput::Complete { token, .. } => match ctx.codec.verify(&token).unwrap() {
            Claims::Final(claims) => assert_eq!(claims.id, *user.user_id.as_uuid()),
            Claims::Pending(_) => panic!("expected final claims"),
        },
        LoginOutput::OtpRequired { .. } => panic!("no OTP enrolled, expected completion"),
    }
}

#[tokio::test]
async fn login_with_otp_yields_pending_token_only() {
    let ctx = ctx();
    register_alice(&ctx).await;

    let output = LoginUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(LoginInput {
            username: "alice".to_string(),
            password: "pw123".to_string(),
        })
        .await
        .unwrap();

    match output {
        LoginOutput::OtpRequired { temp_token } => {
            assert!(matches!(
                ctx.codec.verify(&temp_token).unwrap(),
                Claims::Pending(_)
            ));
        }
        LoginOutput::Complete { .. } => panic!("enrolled user must not get a final token here"),
    }
}

// ============================================================================
// Login step 2
// ============================================================================

async fn pending_token_for_alice(ctx: &TestCtx) -> (String, String) {
    let registered = register_alice(ctx).await;
    let output = LoginUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(LoginInput {
            username: "alice".to_string(),
            password: "pw123".to_string(),
        })
        .await
        .unwrap();
    match output {
        LoginOutput::OtpRequired { temp_token } => (temp_token, registered.otp_secret),
        LoginOutput::Complete { .. } => panic!("expected pending"),
    }
}

#[tokio::test]
async fn verify_otp_with_current_code_succeeds() {
    let ctx = ctx();
    let (temp_token, secret_base32) = pending_token_for_alice(&ctx).await;

    let secret = OtpSecret::from_base32(secret_base32).unwrap();
    let code = secret.generate_current().unwrap();

    let output = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token,
            otp_token: code,
        })
        .await
        .unwrap();

    assert!(matches!(
        ctx.codec.verify(&output.token).unwrap(),
        Claims::Final(_)
    ));
}

#[tokio::test]
async fn verify_otp_wrong_code_rejected() {
    let ctx = ctx();
    let (temp_token, secret_base32) = pending_token_for_alice(&ctx).await;

    let secret = OtpSecret::from_base32(secret_base32).unwrap();
    let current = secret.generate_current().unwrap();
    let wrong = if current == "000000" { "000001" } else { "000000" };

    let result = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token,
            otp_token: wrong.to_string(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::InvalidOtpCode)));
}

#[tokio::test]
async fn verify_otp_rejects_final_token() {
    let ctx = ctx();
    let registered = register_alice(&ctx).await;

    let secret = OtpSecret::from_base32(registered.otp_secret).unwrap();
    let code = secret.generate_current().unwrap();

    // The final token from registration is the wrong claim shape for step 2
    let result = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token: registered.token,
            otp_token: code,
        })
        .await;

    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn verify_otp_rejects_expired_pending_token() {
    use crate::application::token::{PendingClaims, PendingStep};

    let ctx = ctx();
    let registered = register_alice(&ctx).await;

    let expired = ctx
        .codec
        .sign(&Claims::Pending(PendingClaims {
            id: *registered.user.user_id.as_uuid(),
            username: "alice".to_string(),
            step: PendingStep::OtpPending,
            exp: chrono::Utc::now().timestamp() - 60,
        }))
        .unwrap();

    let secret = OtpSecret::from_base32(registered.otp_secret).unwrap();
    let code = secret.generate_current().unwrap();

    let result = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token: expired,
            otp_token: code,
        })
        .await;

    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn verify_otp_rejects_deleted_user() {
    let ctx = ctx();
    let (temp_token, secret_base32) = pending_token_for_alice(&ctx).await;

    // Account disappears between step 1 and step 2
    {
        let mut users = ctx.store.users.lock().unwrap();
        users.clear();
    }

    let secret = OtpSecret::from_base32(secret_base32).unwrap();
    let code = secret.generate_current().unwrap();

    let result = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token,
            otp_token: code,
        })
        .await;

    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

// ============================================================================
// Bearer guard
// ============================================================================

#[tokio::test]
async fn guard_accepts_final_token() {
    let ctx = ctx();
    let registered = register_alice(&ctx).await;

    let user = authenticate_bearer(
        &bearer_headers(&registered.token),
        &ctx.codec,
        ctx.store.as_ref(),
    )
    .await
    .unwrap();

    assert_eq!(user.user_id, registered.user.user_id);
}

#[tokio::test]
async fn guard_rejects_pending_token() {
    let ctx = ctx();
    let (temp_token, _) = pending_token_for_alice(&ctx).await;

    // Correctly signed, unexpired, and still rejected
    let result = authenticate_bearer(
        &bearer_headers(&temp_token),
        &ctx.codec,
        ctx.store.as_ref(),
    )
    .await;

    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn guard_rejects_missing_and_malformed_headers() {
    let ctx = ctx();
    register_alice(&ctx).await;

    let empty = HeaderMap::new();
    let result = authenticate_bearer(&empty, &ctx.codec, ctx.store.as_ref()).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));

    let mut no_scheme = HeaderMap::new();
    no_scheme.insert(header::AUTHORIZATION, HeaderValue::from_static("garbage"));
    let result = authenticate_bearer(&no_scheme, &ctx.codec, ctx.store.as_ref()).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn guard_rejects_token_signed_with_other_key() {
    let ctx = ctx();
    let registered = register_alice(&ctx).await;

    let other_codec = TokenCodec::new(&AuthConfig::new("different-secret"));
    let forged = other_codec.issue_final(&registered.user).unwrap();

    let result =
        authenticate_bearer(&bearer_headers(&forged), &ctx.codec, ctx.store.as_ref()).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

// ============================================================================
// OTP setup
// ============================================================================

#[tokio::test]
async fn otp_setup_provisions_once_and_stays_stable() {
    let ctx = ctx();
    let user = insert_user_without_otp(&ctx, "bob", "bob@x.com", "pw123").await;

    let use_case = OtpSetupUseCase::new(ctx.store.clone(), ctx.config.clone());

    let first = use_case.execute(&user).await.unwrap();
    assert!(first.otpauth_url.starts_with("otpauth://totp/"));

    // Reload: the secret was persisted, and a second call returns it unchanged
    let reloaded = ctx
        .store
        .find_by_id(&user.user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.has_otp());

    let second = use_case.execute(&reloaded).await.unwrap();
    assert_eq!(first.secret, second.secret);
}

#[tokio::test]
async fn otp_setup_never_rotates_existing_secret() {
    let ctx = ctx();
    let registered = register_alice(&ctx).await;

    let output = OtpSetupUseCase::new(ctx.store.clone(), ctx.config.clone())
        .execute(&registered.user)
        .await
        .unwrap();

    assert_eq!(output.secret, registered.otp_secret);
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn full_two_phase_login_scenario() {
    let ctx = ctx();

    // Register alice/alice@x.com/pw123 -> final token T1 + secret S
    let registered = register_alice(&ctx).await;
    let secret = OtpSecret::from_base32(registered.otp_secret.clone()).unwrap();

    // Step 1: secret is enrolled, so login yields pending token T2
    let t2 = match LoginUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(LoginInput {
            username: "alice".to_string(),
            password: "pw123".to_string(),
        })
        .await
        .unwrap()
    {
        LoginOutput::OtpRequired { temp_token } => temp_token,
        LoginOutput::Complete { .. } => panic!("expected OTP requirement"),
    };

    // Step 2: T2 + totp(S, now) -> final token T3
    let code = secret.generate_current().unwrap();
    let t3 = VerifyOtpUseCase::new(ctx.store.clone(), ctx.codec.clone())
        .execute(VerifyOtpInput {
            temp_token: t2.clone(),
            otp_token: code,
        })
        .await
        .unwrap()
        .token;

    // Guard: T3 reaches the profile, T2 never does
    let me = authenticate_bearer(&bearer_headers(&t3), &ctx.codec, ctx.store.as_ref())
        .await
        .unwrap();
    assert_eq!(me.user_name.original(), "alice");
    assert_eq!(me.email.as_str(), "alice@x.com");

    let rejected =
        authenticate_bearer(&bearer_headers(&t2), &ctx.codec, ctx.store.as_ref()).await;
    assert!(matches!(rejected, Err(AuthError::InvalidToken)));
}
