//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the
//! authorization policy.

pub mod access;
pub mod entity;
pub mod policy;
pub mod repository;
pub mod value_object;

// Re-exports
pub use access::{AccessDecision, decide};
pub use entity::{Claims, IssuedSession, TokenPair, User};
pub use policy::{PolicyEngine, PolicyError, PolicyRule};
pub use repository::{ActivationMailer, MailError, SessionStore, UserRepository};
