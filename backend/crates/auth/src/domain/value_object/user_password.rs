//! User Password Value Object
//!
//! The stored side of a password: an Argon2id PHC string. Hashing and
//! verification live in `application::credentials`, which moves the work off
//! the async executor.

use platform::password::{HashedPassword, PasswordHashError};
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_hashed(hashed: HashedPassword) -> Self {
        Self(hashed)
    }

    /// Load a stored PHC string.
    pub fn from_db(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc).map(Self)
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn hashed(&self) -> &HashedPassword {
        &self.0
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([HASH])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{ClearTextPassword, HashingCost};

    #[test]
    fn test_db_roundtrip_and_redacted_debug() {
        let hashed = ClearTextPassword::new("Secret123!".to_string())
            .unwrap()
            .hash(HashingCost::minimal(), None)
            .unwrap();
        let password = UserPassword::from_hashed(hashed);

        let loaded = UserPassword::from_db(password.as_phc_string()).unwrap();
        assert_eq!(loaded, password);
        assert_eq!(format!("{:?}", loaded), "UserPassword([HASH])");
    }

    #[test]
    fn test_from_db_rejects_garbage() {
        assert!(UserPassword::from_db("not-a-phc-string").is_err());
    }
}
