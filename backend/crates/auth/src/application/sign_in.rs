//! Sign In Use Case
//!
//! Authenticates a user by email and password and starts a new session.
//! Activation is not required to sign in.

use std::sync::Arc;

use crate::application::credentials::CredentialService;
use crate::application::session::{AuthOutput, start_session};
use crate::application::tokens::TokenIssuer;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    session_store: Arc<S>,
    credentials: CredentialService,
    tokens: Arc<TokenIssuer>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    pub fn new(
        user_repo: Arc<U>,
        session_store: Arc<S>,
        credentials: CredentialService,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            user_repo,
            session_store,
            credentials,
            tokens,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<AuthOutput> {
        let email = Email::new(&input.email)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Err(e) = self
            .credentials
            .verify_password(&user.password_hash, input.password)
            .await
        {
            tracing::warn!(user_id = %user.user_id, "Sign-in with wrong password");
            return Err(e);
        }

        let session = start_session(&self.tokens, self.session_store.as_ref(), &user).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(AuthOutput { user, session })
    }
}
