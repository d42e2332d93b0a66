//! Resend Activation Email Use Case

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::mail::dispatch_activation_email;
use crate::domain::repository::{ActivationMailer, UserRepository};
use crate::domain::value_object::{activation_code::ActivationCode, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// Regenerates the activation code (the old one stops matching) and mails
/// it again.
pub struct ResendActivationUseCase<U, M>
where
    U: UserRepository,
    M: ActivationMailer + Sync + 'static,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> ResendActivationUseCase<U, M>
where
    U: UserRepository,
    M: ActivationMailer + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.reissue_activation_code(ActivationCode::generate(
            self.config.activation_code_length,
        ))?;
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Activation code reissued");

        dispatch_activation_email(self.mailer.clone(), user);
        Ok(())
    }
}
