//! Role Value Object
//!
//! Roles are plain codes matched against the policy table. Four codes have
//! meaning to the auth flows themselves:
//!
//! - `anonymous`: held by every caller without a bearer token
//! - `inactive`: the only role of a freshly signed-up account
//! - `user`: granted on activation
//! - `admin`: granted out of band

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

pub const ANONYMOUS: &str = "anonymous";
pub const INACTIVE: &str = "inactive";
pub const USER: &str = "user";
pub const ADMIN: &str = "admin";

const ROLE_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct Role(String);

impl Role {
    /// Parse a role code: lowercase ASCII letters, digits, `_`, `-`, `:`.
    pub fn new(code: impl AsRef<str>) -> AuthResult<Self> {
        let code = code.as_ref().trim();
        if code.is_empty() || code.len() > ROLE_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Role code must be 1 to {} characters",
                ROLE_MAX_LENGTH
            )));
        }
        let valid = code
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'-' | b':'));
        if !valid {
            return Err(AuthError::Validation(format!("Invalid role code: {}", code)));
        }
        Ok(Self(code.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn inactive() -> Self {
        Self(INACTIVE.to_string())
    }

    pub fn user() -> Self {
        Self(USER.to_string())
    }

    pub fn admin() -> Self {
        Self(ADMIN.to_string())
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS
    }

    #[inline]
    pub fn is_inactive(&self) -> bool {
        self.0 == INACTIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_roles() {
        assert!(Role::anonymous().is_anonymous());
        assert!(Role::inactive().is_inactive());
        assert_eq!(Role::user().code(), "user");
        assert_eq!(Role::admin().to_string(), "admin");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::new(" editor ").unwrap().code(), "editor");
        assert!(Role::new("billing:read").is_ok());
        assert!(Role::new("").is_err());
        assert!(Role::new("Admin").is_err());
        assert!(Role::new("a b").is_err());
    }

    #[test]
    fn test_role_serde_is_plain_string() {
        let json = serde_json::to_string(&vec![Role::inactive()]).unwrap();
        assert_eq!(json, r#"["inactive"]"#);
        let back: Vec<Role> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Role::inactive()]);
    }
}
