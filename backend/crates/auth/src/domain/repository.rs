//! Repository Traits
//!
//! Interfaces for persistence and outbound delivery. Implementations are in
//! the infrastructure layer.

use thiserror::Error;

use crate::domain::entity::{session::TokenPair, user::User};
use crate::domain::value_object::{email::Email, session_id::SessionId, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. A taken email is `AuthError::EmailTaken`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Overwrite roles, activation code and profile fields.
    /// A missing row is `AuthError::UserNotFound`.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;
}

/// Live-token store.
///
/// Every failure to reach the backend (timeout, refused connection) must
/// surface as `AuthError::ServiceUnavailable`.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Store both tokens of a new session, each under its own TTL.
    /// Either both keys are written or neither is.
    async fn create_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        tokens: &TokenPair,
    ) -> AuthResult<()>;

    /// The access key exists and holds exactly `access_token`.
    async fn session_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        access_token: &str,
    ) -> AuthResult<bool>;

    /// The refresh key exists and holds exactly `refresh_token`.
    async fn refresh_token_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool>;

    /// Compare-and-delete: when the stored refresh token equals
    /// `refresh_token`, delete both keys of the session and return `true`.
    /// Of two concurrent callers with the same token, at most one wins.
    async fn consume_refresh_token(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool>;

    /// Remove both keys. Idempotent.
    async fn delete_session(&self, user_id: &UserId, session_id: &SessionId) -> AuthResult<()>;

    /// Remove every key of the user. Returns the number of keys removed.
    async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> AuthResult<u64>;
}

/// Activation mail delivery failure
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport failed: {0}")]
    Transport(String),

    #[error("Mail relay rejected the message with status {0}")]
    Rejected(u16),
}

/// Outbound activation mail.
#[trait_variant::make(ActivationMailer: Send)]
pub trait LocalActivationMailer {
    /// Deliver the user's current activation code.
    async fn send_activation_email(&self, user: &User) -> Result<(), MailError>;
}
