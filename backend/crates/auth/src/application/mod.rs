//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod otp_setup;
pub mod register;
pub mod token;
pub mod verify_otp;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use otp_setup::{OtpSetupOutput, OtpSetupUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use token::{Claims, FinalClaims, PendingClaims, TokenCodec, TokenError};
pub use verify_otp::{VerifyOtpInput, VerifyOtpOutput, VerifyOtpUseCase};
