//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    ActivateAccountUseCase, AuthContext, AuthenticatedSession, CredentialService, RefreshInput,
    RefreshTokensUseCase, ResendActivationUseCase, SignInInput, SignInUseCase, SignOutUseCase,
    SignUpInput, SignUpUseCase, TokenIssuer,
};
use crate::domain::repository::{ActivationMailer, SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ActivateRequest, AuthResponse, RefreshRequest, SignInRequest, SignUpRequest, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<U, S, M> {
    pub users: Arc<U>,
    pub sessions: Arc<S>,
    pub mailer: Arc<M>,
    pub credentials: CredentialService,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<AuthConfig>,
}

impl<U, S, M> Clone for AuthAppState<U, S, M> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            mailer: self.mailer.clone(),
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

/// The live session the authorization middleware attached to the request.
///
/// Rejects with 401 when the request was let through anonymously.
pub struct CurrentSession(pub AuthenticatedSession);

impl<St> FromRequestParts<St> for CurrentSession
where
    St: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(session)) => Ok(Self(session.clone())),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /auth/sign-up
pub async fn sign_up<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.mailer.clone(),
        state.credentials.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = SignUpInput {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;
    Ok((StatusCode::CREATED, Json(output.into())))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /auth/sign-in
pub async fn sign_in<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.credentials.clone(),
        state.tokens.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;
    Ok(Json(output.into()))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /auth/sign-out
pub async fn sign_out<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    CurrentSession(session): CurrentSession,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let use_case = SignOutUseCase::new(state.sessions.clone());
    use_case
        .execute(&session.user_id, &session.session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /auth/refresh
///
/// The refresh token names its own user and session; only its signature is
/// checked here, liveness is the use case's job.
pub async fn refresh<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let claims = state
        .tokens
        .verify_refresh_token_signature(&req.refresh_token)?;

    let use_case = RefreshTokensUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.tokens.clone(),
    );

    let input = RefreshInput {
        user_id: claims.sub,
        session_id: claims.session_id,
        refresh_token: req.refresh_token,
    };

    let output = use_case.execute(input).await?;
    Ok(Json(output.into()))
}

// ============================================================================
// Activation
// ============================================================================

/// POST /auth/activate
pub async fn activate<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<ActivateRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let use_case = ActivateAccountUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(&session.user_id, &req.activation_code)
        .await?;
    Ok(Json(output.into()))
}

/// POST /auth/activation/resend
pub async fn resend_activation<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    CurrentSession(session): CurrentSession,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let use_case = ResendActivationUseCase::new(
        state.users.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    use_case.execute(&session.user_id).await?;
    Ok(StatusCode::ACCEPTED)
}

// ============================================================================
// Current User
// ============================================================================

/// GET /auth/me
pub async fn me<U, S, M>(
    State(state): State<AuthAppState<U, S, M>>,
    CurrentSession(session): CurrentSession,
) -> AuthResult<Json<UserResponse>>
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    let user = state
        .users
        .find_by_id(&session.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(UserResponse::from(&user)))
}
