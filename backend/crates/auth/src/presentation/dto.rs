//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::AuthOutput;
use crate::domain::entity::user::User;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Refresh / Activation
// ============================================================================

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub activation_code: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a user. Never carries the hash or the activation code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub created_at: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            roles: user.roles.iter().map(|r| r.code().to_string()).collect(),
            created_at: user.created_at.timestamp_millis(),
        }
    }
}

/// Body of every token-issuing endpoint
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl From<AuthOutput> for AuthResponse {
    fn from(output: AuthOutput) -> Self {
        let tokens = output.session.tokens;
        Self {
            user: UserResponse::from(&output.user),
            expires_in: tokens.access_ttl.as_secs(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_request_is_camel_case() {
        let req: SignUpRequest = serde_json::from_str(
            r#"{"firstName":"Ada","lastName":"Lovelace","email":"a@b.com","password":"Secret123!"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.last_name, "Lovelace");
    }

    #[test]
    fn test_refresh_request_requires_token() {
        assert!(serde_json::from_str::<RefreshRequest>("{}").is_err());
        let req: RefreshRequest = serde_json::from_str(r#"{"refreshToken":"x.y.z"}"#).unwrap();
        assert_eq!(req.refresh_token, "x.y.z");
    }
}
