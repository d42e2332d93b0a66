//! Access Decision
//!
//! The authorization middleware's two-tier rule as a pure function, so it can
//! be tested without a session store or network:
//!
//! 1. A caller without a token, or holding `anonymous`, is judged by the
//!    `anonymous` rules alone and never needs a live session.
//! 2. Otherwise the held roles are tried in order; the first permitting role
//!    wins, and the caller's session must still be live.

use axum::http::Method;

use crate::domain::policy::PolicyEngine;
use crate::domain::value_object::role::{self, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Anonymous access is permitted; no session lookup.
    Public,
    /// `role` permits the request, provided the session is live.
    RequiresLiveSession { role: Role },
    /// Anonymous caller on a route anonymous may not use.
    Unauthorized,
    /// Authenticated, but no held role permits the request.
    Forbidden,
}

/// Decide what the middleware does with a request.
///
/// `roles` is ignored when `token_present` is false.
pub fn decide(
    policy: &PolicyEngine,
    roles: &[Role],
    path: &str,
    method: &Method,
    token_present: bool,
) -> AccessDecision {
    if !token_present || roles.iter().any(Role::is_anonymous) {
        return if policy.enforce(role::ANONYMOUS, path, method) {
            AccessDecision::Public
        } else {
            AccessDecision::Unauthorized
        };
    }

    roles
        .iter()
        .find(|role| policy.enforce(role.code(), path, method))
        .map(|role| AccessDecision::RequiresLiveSession { role: role.clone() })
        .unwrap_or(AccessDecision::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::PolicyRule;

    fn policy() -> PolicyEngine {
        PolicyEngine::from_rules([
            PolicyRule::new("anonymous", "/auth/sign-in", "POST"),
            PolicyRule::new("inactive", "/auth/activate", "POST"),
            PolicyRule::new("user", "/auth/me", "GET"),
            PolicyRule::new("admin", "/admin/*", "*"),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_token_public_route() {
        let decision = decide(&policy(), &[], "/auth/sign-in", &Method::POST, false);
        assert_eq!(decision, AccessDecision::Public);
    }

    #[test]
    fn test_no_token_protected_route() {
        let decision = decide(&policy(), &[], "/auth/me", &Method::GET, false);
        assert_eq!(decision, AccessDecision::Unauthorized);
    }

    #[test]
    fn test_roles_ignored_without_token() {
        let decision = decide(&policy(), &[Role::user()], "/auth/me", &Method::GET, false);
        assert_eq!(decision, AccessDecision::Unauthorized);
    }

    #[test]
    fn test_anonymous_role_in_token_short_circuits() {
        let roles = [Role::user(), Role::anonymous()];
        assert_eq!(
            decide(&policy(), &roles, "/auth/sign-in", &Method::POST, true),
            AccessDecision::Public
        );
        assert_eq!(
            decide(&policy(), &roles, "/auth/me", &Method::GET, true),
            AccessDecision::Unauthorized
        );
    }

    #[test]
    fn test_first_permitting_role_wins() {
        let roles = [Role::inactive(), Role::user(), Role::admin()];
        assert_eq!(
            decide(&policy(), &roles, "/auth/me", &Method::GET, true),
            AccessDecision::RequiresLiveSession { role: Role::user() }
        );
        assert_eq!(
            decide(&policy(), &roles, "/admin/users", &Method::DELETE, true),
            AccessDecision::RequiresLiveSession { role: Role::admin() }
        );
    }

    #[test]
    fn test_no_permitting_role_is_forbidden() {
        let decision = decide(&policy(), &[Role::inactive()], "/auth/me", &Method::GET, true);
        assert_eq!(decision, AccessDecision::Forbidden);

        let decision = decide(&policy(), &[], "/auth/me", &Method::GET, true);
        assert_eq!(decision, AccessDecision::Forbidden);
    }
}
