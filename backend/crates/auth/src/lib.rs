//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - User registration with username + email + password
//! - Two-phase login: password check, then TOTP code for enrolled users
//! - Stateless bearer tokens (HS256 JWT), no server-side session store
//! - TOTP enrollment/status endpoints (Google Authenticator compatible)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Pending tokens (issued mid-login) carry a distinct claim shape and are
//!   rejected by the bearer guard; only final tokens reach protected routes
//! - Token expiry: 24 hours final, 5 minutes pending
//! - Logout is client-side; key rotation is the only server-side revocation

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::{Claims, TokenCodec};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgUserStore;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgUserStore as UserStoreImpl;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
