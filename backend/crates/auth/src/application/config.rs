//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::config::{ConfigError, Env};
use platform::crypto;
use platform::password::HashingCost;

use crate::domain::value_object::activation_code::ACTIVATION_CODE_LENGTH;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_token_ttl: Duration,
    /// Upper bound on every session store call
    pub session_store_timeout: Duration,
    /// Argon2id parameters for new hashes
    pub hashing_cost: HashingCost,
    /// Concurrent hash/verify jobs on the blocking pool
    pub hashing_concurrency: usize,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Characters in a generated activation code
    pub activation_code_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            session_store_timeout: Duration::from_secs(2),
            hashing_cost: HashingCost::default(),
            hashing_concurrency: 4,
            password_pepper: None,
            activation_code_length: ACTIVATION_CODE_LENGTH,
        }
    }
}

impl AuthConfig {
    /// Create config for development (cheaper hashing)
    pub fn development() -> Self {
        Self {
            hashing_cost: HashingCost {
                memory_kib: 4096,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        }
    }

    /// Read overrides from the environment. Unset variables keep defaults.
    ///
    /// `PASSWORD_PEPPER` is standard base64. `DEV_PASSWORD_HASHING=true`
    /// switches to the [`development`](Self::development) Argon2 cost.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let hashing_cost = if env.parse_or("DEV_PASSWORD_HASHING", false)? {
            tracing::warn!("DEV_PASSWORD_HASHING is set; using development Argon2 cost");
            Self::development().hashing_cost
        } else {
            defaults.hashing_cost
        };

        let password_pepper = env
            .get("PASSWORD_PEPPER")
            .map(|raw| {
                crypto::from_base64(raw.trim()).map_err(|e| ConfigError::Invalid {
                    name: "PASSWORD_PEPPER".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let hashing_concurrency = env.parse_or("HASH_CONCURRENCY", defaults.hashing_concurrency)?;
        if hashing_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "HASH_CONCURRENCY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            access_token_ttl: env.secs_or("ACCESS_TOKEN_TTL_SECS", defaults.access_token_ttl)?,
            refresh_token_ttl: env.secs_or("REFRESH_TOKEN_TTL_SECS", defaults.refresh_token_ttl)?,
            session_store_timeout: env
                .millis_or("SESSION_STORE_TIMEOUT_MS", defaults.session_store_timeout)?,
            hashing_cost,
            hashing_concurrency,
            password_pepper,
            ..defaults
        })
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cheapest settings that still exercise every code path.
    #[cfg(test)]
    pub(crate) fn testing() -> Self {
        Self {
            hashing_cost: HashingCost::minimal(),
            session_store_timeout: Duration::from_millis(200),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("session_store_timeout", &self.session_store_timeout)
            .field("hashing_cost", &self.hashing_cost)
            .field("hashing_concurrency", &self.hashing_concurrency)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("activation_code_length", &self.activation_code_length)
            .finish()
    }
}
