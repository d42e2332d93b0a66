//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no business rules:
//! - Password hashing (Argon2id) and password policy
//! - Randomness, SHA-256 and Base64 helpers
//! - Request header helpers (bearer tokens, client IP)
//! - Environment-variable configuration helpers

pub mod client;
pub mod config;
pub mod crypto;
pub mod password;
