//! Activation Code Value Object
//!
//! Short random code mailed to a new account. Comparison ignores ASCII case
//! so a code typed in lowercase still matches.

use std::fmt;

use platform::crypto::{constant_time_eq, random_code};

/// Default number of characters in a generated code
pub const ACTIVATION_CODE_LENGTH: usize = 8;

#[derive(Clone, PartialEq, Eq)]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Generate a fresh code of `len` characters.
    pub fn generate(len: usize) -> Self {
        Self(random_code(len))
    }

    /// Create from database value
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Case-insensitive, constant-time match against user input.
    pub fn matches(&self, presented: &str) -> bool {
        let presented = presented.trim().to_ascii_uppercase();
        let stored = self.0.to_ascii_uppercase();
        constant_time_eq(stored.as_bytes(), presented.as_bytes())
    }

    /// The raw code. Only for persistence and the outgoing email.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationCode([REDACTED])")
    }
}
