//! Authorize Use Case
//!
//! Everything the authorization middleware decides, minus HTTP. The anonymous
//! path never touches the session store.

use std::sync::Arc;

use axum::http::Method;

use crate::application::tokens::TokenIssuer;
use crate::domain::access::{AccessDecision, decide};
use crate::domain::policy::PolicyEngine;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{role::Role, session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// Who the request is from, as seen by downstream handlers.
#[derive(Debug, Clone)]
pub enum AuthContext {
    Anonymous,
    Authenticated(AuthenticatedSession),
}

/// A verified bearer token whose session was live when the request arrived.
#[derive(Clone)]
pub struct AuthenticatedSession {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub roles: Vec<Role>,
    /// Role whose rule admitted the request
    pub granted_by: Role,
    pub access_token: String,
}

impl std::fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("user_id", &self.user_id)
            .field("session_id", &self.session_id)
            .field("roles", &self.roles)
            .field("granted_by", &self.granted_by)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl AuthContext {
    pub fn session(&self) -> Option<&AuthenticatedSession> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(session) => Some(session),
        }
    }
}

/// One request to authorize.
pub struct AuthorizeInput<'a> {
    pub bearer_token: Option<&'a str>,
    pub path: &'a str,
    pub method: &'a Method,
}

/// Authorize use case
pub struct AuthorizeUseCase<S>
where
    S: SessionStore,
{
    session_store: Arc<S>,
    tokens: Arc<TokenIssuer>,
    policy: Arc<PolicyEngine>,
}

impl<S> AuthorizeUseCase<S>
where
    S: SessionStore,
{
    pub fn new(session_store: Arc<S>, tokens: Arc<TokenIssuer>, policy: Arc<PolicyEngine>) -> Self {
        Self {
            session_store,
            tokens,
            policy,
        }
    }

    /// `Unauthorized`, `Forbidden` or `ServiceUnavailable` on denial.
    pub async fn execute(&self, input: AuthorizeInput<'_>) -> AuthResult<AuthContext> {
        let Some(token) = input.bearer_token else {
            return match decide(&self.policy, &[], input.path, input.method, false) {
                AccessDecision::Public => Ok(AuthContext::Anonymous),
                _ => Err(AuthError::Unauthorized),
            };
        };

        let claims = self
            .tokens
            .verify_access_token(token)
            .map_err(|_| AuthError::Unauthorized)?;

        match decide(&self.policy, &claims.roles, input.path, input.method, true) {
            AccessDecision::Public => Ok(AuthContext::Anonymous),
            AccessDecision::Unauthorized => Err(AuthError::Unauthorized),
            AccessDecision::Forbidden => Err(AuthError::Forbidden),
            AccessDecision::RequiresLiveSession { role } => {
                let live = self
                    .session_store
                    .session_exists(&claims.sub, &claims.session_id, token)
                    .await
                    .map_err(|e| match e {
                        AuthError::ServiceUnavailable(msg) => AuthError::ServiceUnavailable(msg),
                        other => AuthError::ServiceUnavailable(other.to_string()),
                    })?;

                if !live {
                    return Err(AuthError::Unauthorized);
                }

                Ok(AuthContext::Authenticated(AuthenticatedSession {
                    user_id: claims.sub,
                    session_id: claims.session_id,
                    roles: claims.roles,
                    granted_by: role,
                    access_token: token.to_string(),
                }))
            }
        }
    }
}
