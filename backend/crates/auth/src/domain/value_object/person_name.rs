//! Person Name Value Object

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Maximum length in characters
pub const PERSON_NAME_MAX_LENGTH: usize = 100;

/// A first or last name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name. `field` names the input in error messages.
    pub fn new(raw: impl AsRef<str>, field: &str) -> AuthResult<Self> {
        let name = raw.as_ref().trim();

        if name.is_empty() {
            return Err(AuthError::Validation(format!("{} cannot be empty", field)));
        }
        if name.chars().count() > PERSON_NAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "{} must be at most {} characters",
                field, PERSON_NAME_MAX_LENGTH
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AuthError::Validation(format!(
                "{} contains invalid characters",
                field
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_trimmed() {
        let name = PersonName::new("  Ada ", "First name").unwrap();
        assert_eq!(name.as_str(), "Ada");
    }

    #[test]
    fn test_person_name_rejects_blank() {
        let err = PersonName::new("   ", "Last name").unwrap_err();
        assert_eq!(err.to_string(), "Last name cannot be empty");
    }

    #[test]
    fn test_person_name_length_counts_chars() {
        let max = "é".repeat(PERSON_NAME_MAX_LENGTH);
        assert!(PersonName::new(&max, "First name").is_ok());
        let over = "é".repeat(PERSON_NAME_MAX_LENGTH + 1);
        assert!(PersonName::new(&over, "First name").is_err());
    }

    #[test]
    fn test_person_name_rejects_control_chars() {
        assert!(PersonName::new("Ada\u{0}", "First name").is_err());
    }
}
