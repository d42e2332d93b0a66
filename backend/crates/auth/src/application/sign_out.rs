//! Sign Out Use Case
//!
//! Invalidates one session of a user.

use std::sync::Arc;

use crate::domain::repository::SessionStore;
use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionStore,
{
    session_store: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(session_store: Arc<S>) -> Self {
        Self { session_store }
    }

    /// Idempotent: signing out of a dead session succeeds.
    pub async fn execute(&self, user_id: &UserId, session_id: &SessionId) -> AuthResult<()> {
        self.session_store
            .delete_session(user_id, session_id)
            .await?;

        tracing::info!(user_id = %user_id, session_id = %session_id, "User signed out");
        Ok(())
    }
}
