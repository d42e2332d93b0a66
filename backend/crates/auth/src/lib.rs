//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, policy table, repository traits
//! - `application/` - Use cases, credential service, token issuer
//! - `infra/` - PostgreSQL, Redis, in-memory and mail relay implementations
//! - `presentation/` - HTTP handlers, DTOs, router, authorization middleware
//!
//! ## Features
//! - Sign-up with email + password, account activation by emailed code
//! - Sign-in, sign-out, refresh token rotation
//! - Stateless JWT access tokens backed by a server-side session store
//! - Role-based access control from a static policy table
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async executor
//! - Tokens signed with Ed25519 (RS256 selectable), separate access/refresh keys
//! - Every non-anonymous request re-checks that its session is still live
//! - A refresh token is consumed atomically; reuse is rejected

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{CredentialService, SigningKeys, TokenIssuer, parse_algorithm};
pub use domain::policy::{PolicyEngine, PolicyError};
pub use error::{AuthError, AuthResult};
pub use infra::{
    HttpMailer, InMemorySessionStore, InMemoryUserRepository, LogMailer, PgUserRepository,
    RedisSessionStore,
};
pub use presentation::router::{auth_router, with_authorization};
pub use presentation::{AuthAppState, AuthorizationState};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
