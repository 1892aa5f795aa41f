//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::application::{
    LoginInput, LoginOutput, LoginUseCase, OtpSetupUseCase, RegisterInput, RegisterUseCase,
    VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::repository::UserStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, LogoutResponse, OtpSetupResponse, OtpStatusResponse,
    RegisterRequest, RegisterResponse, RegisteredUserBody, UserBody, VerifyOtpRequest,
    VerifyOtpResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<S>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

/// Unwrap a request field, reporting its name on absence
fn require(field: Option<String>, name: &'static str) -> AuthResult<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::MissingField(name)),
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<S>(
    State(state): State<AuthAppState<S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    let input = RegisterInput {
        username: require(req.username, "username")?,
        email: require(req.email, "email")?,
        password: require(req.password, "password")?,
    };

    let use_case = RegisterUseCase::new(state.store.clone(), state.codec.clone());
    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: RegisteredUserBody::from(&output.user),
            token: output.token,
            otp_secret: output.otp_secret,
        }),
    ))
}

// ============================================================================
// Login (step 1)
// ============================================================================

/// POST /auth/login
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    let input = LoginInput {
        username: require(req.username, "username")?,
        password: require(req.password, "password")?,
    };

    let use_case = LoginUseCase::new(state.store.clone(), state.codec.clone());

    let response = match use_case.execute(input).await? {
        LoginOutput::Complete { user, token } => LoginResponse::Complete {
            success: true,
            token,
            user: UserBody::from(&user),
        },
        LoginOutput::OtpRequired { temp_token } => LoginResponse::OtpRequired {
            success: false,
            requires_otp: true,
            temp_token,
            message: "OTP code required to complete login".to_string(),
        },
    };

    Ok(Json(response))
}

// ============================================================================
// Verify OTP (step 2)
// ============================================================================

/// POST /auth/verify-otp
pub async fn verify_otp<S>(
    State(state): State<AuthAppState<S>>,
    Json(req): Json<VerifyOtpRequest>,
) -> AuthResult<Json<VerifyOtpResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    let input = VerifyOtpInput {
        temp_token: require(req.temp_token, "temp_token")?,
        otp_token: require(req.otp_token, "otp_token")?,
    };

    let use_case = VerifyOtpUseCase::new(state.store.clone(), state.codec.clone());
    let output = use_case.execute(input).await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        token: output.token,
        user: UserBody::from(&output.user),
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
///
/// Stateless acknowledgment: the token stays valid until it expires, the
/// client just discards it. Key rotation is the only server-side revocation.
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        success: true,
        message: "Logged out".to_string(),
    })
}

// ============================================================================
// OTP Enrollment (guarded)
// ============================================================================

/// GET /auth/otp/setup
pub async fn otp_setup<S>(
    State(state): State<AuthAppState<S>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AuthResult<Json<OtpSetupResponse>>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    let use_case = OtpSetupUseCase::new(state.store.clone(), state.config.clone());
    let output = use_case.execute(&user).await?;

    Ok(Json(OtpSetupResponse {
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// GET /auth/otp/status
pub async fn otp_status(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<OtpStatusResponse> {
    Json(OtpStatusResponse {
        otp_enabled: user.has_otp(),
    })
}

// ============================================================================
// Current User (guarded)
// ============================================================================

/// GET /auth/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserBody> {
    Json(UserBody::from(&user))
}
