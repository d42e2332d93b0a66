//! Authorization Middleware
//!
//! Runs in front of every route. Resolves the caller from the bearer token,
//! checks the policy table and, for non-anonymous access, that the session is
//! still live. Handlers read the outcome as an [`AuthContext`] extension.

use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::client::extract_bearer_token;
use std::sync::Arc;

use crate::application::{AuthContext, AuthorizeInput, AuthorizeUseCase, TokenIssuer};
use crate::domain::policy::PolicyEngine;
use crate::domain::repository::SessionStore;
use crate::error::AuthError;

/// Middleware state
pub struct AuthorizationState<S> {
    pub sessions: Arc<S>,
    pub tokens: Arc<TokenIssuer>,
    pub policy: Arc<PolicyEngine>,
}

impl<S> Clone for AuthorizationState<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            tokens: self.tokens.clone(),
            policy: self.policy.clone(),
        }
    }
}

/// Authorize the request against the policy table.
///
/// Denials carry only the generic status title.
pub async fn authorize<S>(
    State(state): State<AuthorizationState<S>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    S: SessionStore + Sync + 'static,
{
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().clone();
    let token = extract_bearer_token(req.headers()).map(str::to_string);

    let use_case = AuthorizeUseCase::new(
        state.sessions.clone(),
        state.tokens.clone(),
        state.policy.clone(),
    );

    let input = AuthorizeInput {
        bearer_token: token.as_deref(),
        path: &path,
        method: &method,
    };

    match use_case.execute(input).await {
        Ok(context) => {
            if let AuthContext::Authenticated(session) = &context {
                tracing::debug!(
                    user_id = %session.user_id,
                    session_id = %session.session_id,
                    role = %session.granted_by,
                    %method,
                    path = %path,
                    "Request authorized"
                );
            }
            req.extensions_mut().insert(context);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(%method, path = %path, error = %err, "Request denied");
            denial_response(&err)
        }
    }
}

fn denial_response(err: &AuthError) -> Response {
    if err.kind().is_server_error() {
        err.log();
    }

    let kind = err.kind();
    let mut response = AppError::new(kind, kind.as_str()).into_response();
    if matches!(err, AuthError::Unauthorized) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unauthorized_denial_challenges_bearer() {
        let response = denial_response(&AuthError::Unauthorized);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_other_denials_have_no_challenge() {
        let response = denial_response(&AuthError::Forbidden);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let response =
            denial_response(&AuthError::ServiceUnavailable("redis down".to_string()));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
