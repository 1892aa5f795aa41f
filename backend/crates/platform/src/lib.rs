//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Password hashing (Argon2id, self-salting PHC strings)

pub mod password;
