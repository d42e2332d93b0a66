//! Detached activation mail dispatch.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::entity::user::User;
use crate::domain::repository::ActivationMailer;

/// Send the activation email on a background task.
///
/// The caller never waits for it; failures end up in the logs only.
pub(crate) fn dispatch_activation_email<M>(mailer: Arc<M>, user: User) -> JoinHandle<()>
where
    M: ActivationMailer + Sync + 'static,
{
    tokio::spawn(async move {
        match mailer.send_activation_email(&user).await {
            Ok(()) => {
                tracing::debug!(user_id = %user.user_id, "Activation email sent");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    error = %e,
                    "Activation email dispatch failed"
                );
            }
        }
    })
}
