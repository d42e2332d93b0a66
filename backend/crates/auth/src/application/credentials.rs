//! Credential Service
//!
//! Argon2id hashing and verification on tokio's blocking pool. A semaphore
//! caps how many run at once.

use std::sync::Arc;

use platform::password::{ClearTextPassword, HashingCost, PasswordHashError};
use tokio::sync::Semaphore;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_password::UserPassword;
use crate::error::{AuthError, AuthResult, CredentialError};

#[derive(Clone)]
pub struct CredentialService {
    cost: HashingCost,
    pepper: Option<Arc<[u8]>>,
    permits: Arc<Semaphore>,
}

impl CredentialService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            cost: config.hashing_cost,
            pepper: config.pepper().map(Arc::from),
            permits: Arc::new(Semaphore::new(config.hashing_concurrency.max(1))),
        }
    }

    /// Validate a new password against the policy and hash it.
    pub async fn hash_password(&self, plaintext: String) -> AuthResult<UserPassword> {
        let password = ClearTextPassword::new(plaintext)?;
        let cost = self.cost;
        let pepper = self.pepper.clone();

        let hashed = self
            .run_blocking(move || password.hash(cost, pepper.as_deref()))
            .await?
            .map_err(hash_failure)?;

        Ok(UserPassword::from_hashed(hashed))
    }

    /// Check a presented password against a stored hash.
    ///
    /// A mismatch is `CredentialError::InvalidPassword`; an unusable stored
    /// hash is an internal error.
    pub async fn verify_password(&self, stored: &UserPassword, plaintext: String) -> AuthResult<()> {
        let password = ClearTextPassword::for_verification(plaintext);
        let hashed = stored.hashed().clone();
        let pepper = self.pepper.clone();

        let valid = self
            .run_blocking(move || hashed.verify(&password, pepper.as_deref()))
            .await?
            .map_err(hash_failure)?;

        if valid {
            Ok(())
        } else {
            Err(CredentialError::InvalidPassword.into())
        }
    }

    async fn run_blocking<T, F>(&self, job: F) -> AuthResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AuthError::Internal("Hashing pool closed".to_string()))?;

        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))
    }
}

fn hash_failure(err: PasswordHashError) -> AuthError {
    AuthError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new(&AuthConfig::testing())
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let credentials = service();
        let stored = credentials.hash_password("Secret123!".to_string()).await.unwrap();
        assert!(stored.as_phc_string().starts_with("$argon2id$"));
        credentials
            .verify_password(&stored, "Secret123!".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let credentials = service();
        let stored = credentials.hash_password("Secret123!".to_string()).await.unwrap();
        let err = credentials
            .verify_password(&stored, "Secret123?".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Credential(CredentialError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_policy_violation_is_validation() {
        let err = service().hash_password("short".to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pepper_is_applied() {
        let peppered = CredentialService::new(&AuthConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..AuthConfig::testing()
        });
        let stored = peppered.hash_password("Secret123!".to_string()).await.unwrap();

        assert!(peppered
            .verify_password(&stored, "Secret123!".to_string())
            .await
            .is_ok());
        assert!(service()
            .verify_password(&stored, "Secret123!".to_string())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_concurrent_hashing_with_single_permit() {
        let credentials = CredentialService::new(&AuthConfig {
            hashing_concurrency: 1,
            ..AuthConfig::testing()
        });
        let (a, b) = tokio::join!(
            credentials.hash_password("Secret123!".to_string()),
            credentials.hash_password("Another456?".to_string()),
        );
        assert!(a.is_ok() && b.is_ok());
    }
}
