//! Session Entity
//!
//! A session is the pair of live tokens stored under
//! `access:{user_id}:{session_id}` and `refresh:{user_id}:{session_id}`.

use std::fmt;
use std::time::Duration;

use crate::domain::value_object::{session_id::SessionId, user_id::UserId};

const ACCESS_PREFIX: &str = "access";
const REFRESH_PREFIX: &str = "refresh";

/// Freshly signed access and refresh tokens with their lifetimes.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A session that was just created and stored.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: SessionId,
    pub tokens: TokenPair,
}

/// Session store key of an access token.
pub fn access_key(user_id: &UserId, session_id: &SessionId) -> String {
    format!("{}:{}:{}", ACCESS_PREFIX, user_id, session_id)
}

/// Session store key of a refresh token.
pub fn refresh_key(user_id: &UserId, session_id: &SessionId) -> String {
    format!("{}:{}:{}", REFRESH_PREFIX, user_id, session_id)
}

/// Glob patterns covering every key of one user.
pub fn user_key_patterns(user_id: &UserId) -> [String; 2] {
    [
        format!("{}:{}:*", ACCESS_PREFIX, user_id),
        format!("{}:{}:*", REFRESH_PREFIX, user_id),
    ]
}

/// Session id embedded in a key built by [`access_key`] or [`refresh_key`].
pub fn session_id_from_key(key: &str) -> Option<SessionId> {
    key.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let user_id = UserId::new();
        let session_id = SessionId::new();
        assert_eq!(
            access_key(&user_id, &session_id),
            format!("access:{}:{}", user_id, session_id)
        );
        assert_eq!(
            refresh_key(&user_id, &session_id),
            format!("refresh:{}:{}", user_id, session_id)
        );
        assert_eq!(
            session_id_from_key(&refresh_key(&user_id, &session_id)),
            Some(session_id)
        );
        assert_eq!(session_id_from_key("access:garbage"), None);
    }

    #[test]
    fn test_user_patterns_match_only_that_user() {
        let user_id = UserId::new();
        let [access, refresh] = user_key_patterns(&user_id);
        let prefix = access.trim_end_matches('*');
        assert!(access_key(&user_id, &SessionId::new()).starts_with(prefix));
        assert!(!access_key(&UserId::new(), &SessionId::new()).starts_with(prefix));
        assert!(refresh.starts_with("refresh:"));
    }

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair {
            access_token: "aaa.bbb.ccc".into(),
            refresh_token: "ddd.eee.fff".into(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
        };
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("aaa.bbb") && !debug.contains("ddd.eee"));
    }
}
