//! Activate Account Use Case
//!
//! Exchanges the mailed code for the `user` role. Every existing session of
//! the account is revoked, since their tokens still carry `inactive`, and a
//! single fresh session is issued.

use std::sync::Arc;

use crate::application::session::{AuthOutput, start_session};
use crate::application::tokens::TokenIssuer;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Activate account use case
pub struct ActivateAccountUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    session_store: Arc<S>,
    tokens: Arc<TokenIssuer>,
}

impl<U, S> ActivateAccountUseCase<U, S>
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

    pub async fn execute(&self, user_id: &UserId, activation_code: &str) -> AuthResult<AuthOutput> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.activate(activation_code)?;

        // Revoke before persisting so a store failure leaves the account
        // inactive and the code still redeemable.
        let revoked = self
            .session_store
            .delete_all_sessions_for_user(&user.user_id)
            .await?;

        self.user_repo.update(&user).await?;

        let session = start_session(&self.tokens, self.session_store.as_ref(), &user).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            revoked_keys = revoked,
            "Account activated"
        );

        Ok(AuthOutput { user, session })
    }
}
