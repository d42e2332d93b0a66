//! Session issuance shared by every use case that hands out tokens.

use crate::application::tokens::TokenIssuer;
use crate::domain::entity::{session::IssuedSession, user::User};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::session_id::SessionId;
use crate::error::AuthResult;

/// Result of every token-issuing flow.
#[derive(Debug, Clone)]
pub struct AuthOutput {
    pub user: User,
    pub session: IssuedSession,
}

/// Mint a session id, sign a pair for the user's current roles and store it.
pub(crate) async fn start_session<S>(
    tokens: &TokenIssuer,
    sessions: &S,
    user: &User,
) -> AuthResult<IssuedSession>
where
    S: SessionStore,
{
    let session_id = SessionId::new();
    let pair = tokens.issue_token_pair(&user.user_id, &session_id, &user.roles)?;

    sessions
        .create_session(&user.user_id, &session_id, &pair)
        .await?;

    tracing::debug!(
        user_id = %user.user_id,
        session_id = %session_id,
        "Session created"
    );

    Ok(IssuedSession {
        session_id,
        tokens: pair,
    })
}
