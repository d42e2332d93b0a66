//! Refresh Tokens Use Case
//!
//! Rotates a session: the presented refresh token is consumed atomically
//! and a new session with a new id takes its place. The old pair stops
//! working as soon as this succeeds.

use std::sync::Arc;

use platform::crypto::fingerprint;

use crate::application::session::{AuthOutput, start_session};
use crate::application::tokens::TokenIssuer;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult, CredentialError};

/// Refresh input
pub struct RefreshInput {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub refresh_token: String,
}

/// Refresh tokens use case
pub struct RefreshTokensUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    session_store: Arc<S>,
    tokens: Arc<TokenIssuer>,
}

impl<U, S> RefreshTokensUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    pub fn new(user_repo: Arc<U>, session_store: Arc<S>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            user_repo,
            session_store,
            tokens,
        }
    }

    pub async fn execute(&self, input: RefreshInput) -> AuthResult<AuthOutput> {
        let user = self
            .user_repo
            .find_by_id(&input.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let claims = self
            .tokens
            .verify_refresh_token_signature(&input.refresh_token)?;
        if claims.sub != input.user_id || claims.session_id != input.session_id {
            return Err(CredentialError::InvalidToken.into());
        }

        let consumed = self
            .session_store
            .consume_refresh_token(&input.user_id, &input.session_id, &input.refresh_token)
            .await?;
        if !consumed {
            tracing::warn!(
                user_id = %input.user_id,
                session_id = %input.session_id,
                token = %fingerprint(&input.refresh_token),
                "Refresh token is not the live token of its session"
            );
            return Err(CredentialError::InvalidToken.into());
        }

        // Roles come from the user record, not the old token
        let session = start_session(&self.tokens, self.session_store.as_ref(), &user).await?;

        tracing::info!(
            user_id = %user.user_id,
            old_session_id = %input.session_id,
            session_id = %session.session_id,
            "Session rotated"
        );

        Ok(AuthOutput { user, session })
    }
}
