//! Token Issuer
//!
//! Signs and verifies the JWT access/refresh pair. Signatures are asymmetric
//! (EdDSA by default, RS256 supported), and access and refresh tokens use
//! separate key pairs, so a refresh token never passes as an access token.
//!
//! Verification is stateless. Whether a token is still live is the session
//! store's business.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::application::config::AuthConfig;
use crate::domain::entity::{claims::Claims, session::TokenPair};
use crate::domain::value_object::{role::Role, session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult, CredentialError};

/// Key loading failures (startup only)
#[derive(Debug, Error)]
pub enum TokenKeyError {
    #[error("Unsupported token algorithm: {0} (expected EdDSA or RS256)")]
    UnsupportedAlgorithm(String),

    #[error("Invalid {which} key: {reason}")]
    InvalidKey { which: &'static str, reason: String },
}

/// Parse a configured algorithm name.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, TokenKeyError> {
    match name.trim() {
        "EdDSA" | "eddsa" | "Ed25519" => Ok(Algorithm::EdDSA),
        "RS256" | "rs256" => Ok(Algorithm::RS256),
        other => Err(TokenKeyError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// One key pair. The private half is optional: without it the keys can
/// only verify.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
}

impl SigningKeys {
    /// Load a PEM key pair (PKCS#8 private key, SPKI public key).
    pub fn from_pem(
        algorithm: Algorithm,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, TokenKeyError> {
        let encoding = match algorithm {
            Algorithm::EdDSA => EncodingKey::from_ed_pem(private_pem),
            Algorithm::RS256 => EncodingKey::from_rsa_pem(private_pem),
            other => return Err(TokenKeyError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
        .map_err(|e| TokenKeyError::InvalidKey {
            which: "private",
            reason: e.to_string(),
        })?;

        Ok(Self {
            encoding: Some(encoding),
            ..Self::verify_only(algorithm, public_pem)?
        })
    }

    /// Load only the public half.
    pub fn verify_only(algorithm: Algorithm, public_pem: &[u8]) -> Result<Self, TokenKeyError> {
        let decoding = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(public_pem),
            Algorithm::RS256 => DecodingKey::from_rsa_pem(public_pem),
            other => return Err(TokenKeyError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
        .map_err(|e| TokenKeyError::InvalidKey {
            which: "public",
            reason: e.to_string(),
        })?;

        Ok(Self {
            encoding: None,
            decoding,
        })
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        algorithm: Algorithm,
        access: SigningKeys,
        refresh: SigningKeys,
        config: &AuthConfig,
    ) -> Self {
        Self {
            algorithm,
            access,
            refresh,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign a fresh access/refresh pair for the session.
    pub fn issue_token_pair(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        roles: &[Role],
    ) -> AuthResult<TokenPair> {
        self.issue_token_pair_at(user_id, session_id, roles, Utc::now())
    }

    /// Same as [`issue_token_pair`](Self::issue_token_pair) with an explicit
    /// issue time.
    pub fn issue_token_pair_at(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        roles: &[Role],
        issued_at: DateTime<Utc>,
    ) -> AuthResult<TokenPair> {
        let iat = issued_at.timestamp();
        let claims = |ttl: Duration| Claims {
            sub: *user_id,
            session_id: *session_id,
            roles: roles.to_vec(),
            iat,
            exp: iat.saturating_add(ttl.as_secs() as i64),
        };

        let access_token = self.sign(&self.access, &claims(self.access_ttl))?;
        let refresh_token = self.sign(&self.refresh, &claims(self.refresh_ttl))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_ttl: self.access_ttl,
            refresh_ttl: self.refresh_ttl,
        })
    }

    /// Full check of an access token: shape, signature and expiry, with no
    /// leeway.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        self.verify(&self.access, token, &validation)
    }

    /// Signature-only check of a refresh token. Expiry is not evaluated; the
    /// session store's TTL decides liveness.
    pub fn verify_refresh_token_signature(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);

        self.verify(&self.refresh, token, &validation)
    }

    fn sign(&self, keys: &SigningKeys, claims: &Claims) -> AuthResult<String> {
        let key = keys
            .encoding
            .as_ref()
            .ok_or_else(|| AuthError::Internal("Token issuer has no signing key".to_string()))?;

        encode(&Header::new(self.algorithm), claims, key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))
    }

    fn verify(&self, keys: &SigningKeys, token: &str, validation: &Validation) -> AuthResult<Claims> {
        if token.split('.').count() != 3 {
            return Err(CredentialError::InvalidToken.into());
        }

        decode::<Claims>(token, &keys.decoding, validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Token rejected");
                CredentialError::InvalidToken.into()
            })
    }
}
