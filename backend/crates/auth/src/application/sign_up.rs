//! Sign Up Use Case
//!
//! Creates an inactive account, starts its first session and mails the
//! activation code.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::application::mail::dispatch_activation_email;
use crate::application::session::{AuthOutput, start_session};
use crate::application::tokens::TokenIssuer;
use crate::domain::entity::user::User;
use crate::domain::repository::{ActivationMailer, SessionStore, UserRepository};
use crate::domain::value_object::{
    activation_code::ActivationCode, email::Email, person_name::PersonName,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, S, M>
where
    U: UserRepository,
    S: SessionStore,
    M: ActivationMailer + Sync + 'static,
{
    user_repo: Arc<U>,
    session_store: Arc<S>,
    mailer: Arc<M>,
    credentials: CredentialService,
    tokens: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<U, S, M> SignUpUseCase<U, S, M>
where
    U: UserRepository,
    S: SessionStore,
    M: ActivationMailer + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        session_store: Arc<S>,
        mailer: Arc<M>,
        credentials: CredentialService,
        tokens: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_store,
            mailer,
            credentials,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<AuthOutput> {
        let first_name = PersonName::new(&input.first_name, "First name")?;
        let last_name = PersonName::new(&input.last_name, "Last name")?;
        let email = Email::new(&input.email)?;

        // Cheap pre-check; the unique constraint still decides races
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.credentials.hash_password(input.password).await?;

        let user = User::new_inactive(
            email,
            password_hash,
            first_name,
            last_name,
            ActivationCode::generate(self.config.activation_code_length),
        );
        self.user_repo.create(&user).await?;

        let session = start_session(&self.tokens, self.session_store.as_ref(), &user).await?;

        dispatch_activation_email(self.mailer.clone(), user.clone());

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User signed up"
        );

        Ok(AuthOutput { user, session })
    }
}
