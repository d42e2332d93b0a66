//! Session ID
//!
//! Identifies one login instance of a user. A fresh one is minted on every
//! sign-up, sign-in, refresh and activation.

use kernel::id::{Id, markers};

pub type SessionId = Id<markers::Session>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
