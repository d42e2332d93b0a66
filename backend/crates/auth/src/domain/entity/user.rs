//! User Entity
//!
//! An account. Created inactive by sign-up, promoted by activation, never
//! hard-deleted.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    activation_code::ActivationCode, email::Email, person_name::PersonName, role::Role,
    user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Sign-in identifier, unique
    pub email: Email,
    pub password_hash: UserPassword,
    pub first_name: PersonName,
    pub last_name: PersonName,
    /// Present only while the account is pending activation
    pub activation_code: Option<ActivationCode>,
    /// Ordered; the authorization middleware walks them in this order
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account pending activation (roles exactly `inactive`)
    pub fn new_inactive(
        email: Email,
        password_hash: UserPassword,
        first_name: PersonName,
        last_name: PersonName,
        activation_code: ActivationCode,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            first_name,
            last_name,
            activation_code: Some(activation_code),
            roles: vec![Role::inactive()],
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles are exactly `{inactive}`
    pub fn is_pending_activation(&self) -> bool {
        matches!(self.roles.as_slice(), [only] if only.is_inactive())
    }

    /// Consume the activation code and promote the account to `user`.
    ///
    /// Leaves the entity untouched on any error.
    pub fn activate(&mut self, presented_code: &str) -> AuthResult<()> {
        if !self.is_pending_activation() {
            return Err(AuthError::AlreadyActivated);
        }

        let matches = self
            .activation_code
            .as_ref()
            .is_some_and(|code| code.matches(presented_code));
        if !matches {
            return Err(AuthError::Validation("Invalid activation code".to_string()));
        }

        self.roles = vec![Role::user()];
        self.activation_code = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the activation code; the previous one stops matching.
    pub fn reissue_activation_code(&mut self, code: ActivationCode) -> AuthResult<()> {
        if !self.is_pending_activation() {
            return Err(AuthError::AlreadyActivated);
        }
        self.activation_code = Some(code);
        self.updated_at = Utc::now();
        Ok(())
    }
}
