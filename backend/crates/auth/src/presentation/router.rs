//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::repository::UserStore;
use crate::infra::postgres::PgUserStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthGuardState, require_bearer_auth};

/// Create the Auth router with the PostgreSQL store
pub fn auth_router(store: PgUserStore, config: AuthConfig) -> Router {
    auth_router_generic(store, config)
}

/// Create a generic Auth router for any store implementation
pub fn auth_router_generic<S>(store: S, config: AuthConfig) -> Router
where
    S: UserStore + Clone + Send + Sync + 'static,
{
    let codec = Arc::new(TokenCodec::new(&config));
    let store = Arc::new(store);

    let state = AuthAppState {
        store: store.clone(),
        codec: codec.clone(),
        config: Arc::new(config),
    };

    let guard = AuthGuardState { store, codec };

    // Routes behind the bearer guard; pending tokens never pass it
    let protected = Router::new()
        .route("/otp/setup", get(handlers::otp_setup::<S>))
        .route("/otp/status", get(handlers::otp_status))
        .route("/me", get(handlers::me))
        .layer(from_fn_with_state(guard, require_bearer_auth::<S>));

    Router::new()
        .route("/register", post(handlers::register::<S>))
        .route("/login", post(handlers::login::<S>))
        .route("/verify-otp", post(handlers::verify_otp::<S>))
        .route("/logout", post(handlers::logout))
        .merge(protected)
        .with_state(state)
}
