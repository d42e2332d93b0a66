//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::{ActivationMailer, SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthorizationState, authorize};

/// Auth routes, relative to wherever the caller nests them (normally `/auth`).
pub fn auth_router<U, S, M>(state: AuthAppState<U, S, M>) -> Router
where
    U: UserRepository + Sync + 'static,
    S: SessionStore + Sync + 'static,
    M: ActivationMailer + Sync + 'static,
{
    Router::new()
        .route("/sign-up", post(handlers::sign_up::<U, S, M>))
        .route("/sign-in", post(handlers::sign_in::<U, S, M>))
        .route("/sign-out", post(handlers::sign_out::<U, S, M>))
        .route("/refresh", post(handlers::refresh::<U, S, M>))
        .route("/activate", post(handlers::activate::<U, S, M>))
        .route(
            "/activation/resend",
            post(handlers::resend_activation::<U, S, M>),
        )
        .route("/me", get(handlers::me::<U, S, M>))
        .with_state(state)
}

/// Put the authorization middleware in front of every route of `router`.
///
/// Apply to the outermost router so policy paths match full request paths.
pub fn with_authorization<S>(router: Router, state: AuthorizationState<S>) -> Router
where
    S: SessionStore + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, authorize::<S>))
}
