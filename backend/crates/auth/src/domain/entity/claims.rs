//! JWT claims payload.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{role::Role, session_id::SessionId, user_id::UserId};

/// Payload of both access and refresh tokens.
///
/// `roles` is a snapshot taken at issuance; later role changes do not reach
/// tokens already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: UserId,

    pub session_id: SessionId,

    #[serde(default)]
    pub roles: Vec<Role>,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}
