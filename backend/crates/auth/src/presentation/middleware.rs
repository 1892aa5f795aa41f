//! Bearer Auth Middleware
//!
//! Stateless gate for protected routes: extracts the `Authorization: Bearer`
//! token, verifies it, rejects anything but the final claim shape, loads the
//! user, and exposes it to downstream handlers via request extensions.
//!
//! The pending token issued mid-login must never pass this gate.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::token::{Claims, TokenCodec};
use crate::domain::entity::user::User;
use crate::domain::repository::UserStore;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Middleware state
#[derive(Clone)]
pub struct AuthGuardState<S>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub codec: Arc<TokenCodec>,
}

/// Authenticated user attached to request extensions by the guard
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Authenticate a request by its bearer token
///
/// Fails with a uniform 401 on: missing/malformed header, invalid or expired
/// token, pending claim shape, or a user deleted since the token was issued.
pub async fn authenticate_bearer<S>(
    headers: &HeaderMap,
    codec: &TokenCodec,
    store: &S,
) -> AuthResult<User>
where
    S: UserStore,
{
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::InvalidToken)?;

    let claims = codec.verify(token).map_err(|_| AuthError::InvalidToken)?;

    // The pending shape only authorizes the OTP verification step
    let Claims::Final(final_claims) = claims else {
        return Err(AuthError::InvalidToken);
    };

    let user_id = UserId::from_uuid(final_claims.id);
    store
        .find_by_id(&user_id)
        .await?
        .ok_or(AuthError::InvalidToken)
}

/// Middleware that requires a valid final bearer token
pub async fn require_bearer_auth<S>(
    State(state): State<AuthGuardState<S>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    match authenticate_bearer(req.headers(), &state.codec, state.store.as_ref()).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}
