//! In-Memory Implementations
//!
//! Process-local stand-ins for Postgres and Redis, used by tests and by the
//! API when `REDIS_URL` is unset. Expiry uses `tokio::time::Instant`, so a
//! paused test clock drives TTL eviction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use platform::crypto::constant_time_eq;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::domain::entity::session::{
    TokenPair, access_key, refresh_key, session_id_from_key, user_key_patterns,
};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::{email::Email, session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Session Store
// ============================================================================

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// TTL key/value map behind one lock; every operation is atomic.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::ServiceUnavailable(
                "Session store unreachable".to_string(),
            ));
        }
        Ok(())
    }

    /// Session ids with a live refresh key, sorted.
    pub async fn live_session_ids(&self, user_id: &UserId) -> Vec<SessionId> {
        let [_, refresh_pattern] = user_key_patterns(user_id);
        let prefix = refresh_pattern.trim_end_matches('*');
        let now = Instant::now();

        let entries = self.entries.lock().await;
        let mut ids: Vec<SessionId> = entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && entry.is_live(now))
            .filter_map(|(key, _)| session_id_from_key(key))
            .collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids
    }

    async fn token_matches(&self, key: &str, presented: &str) -> AuthResult<bool> {
        self.check_available()?;
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .is_some_and(|entry| constant_time_eq(entry.value.as_bytes(), presented.as_bytes())))
    }
}

fn live_entry(value: &str, ttl: Duration, now: Instant) -> Entry {
    Entry {
        value: value.to_string(),
        expires_at: now + ttl,
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        tokens: &TokenPair,
    ) -> AuthResult<()> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            access_key(user_id, session_id),
            live_entry(&tokens.access_token, tokens.access_ttl, now),
        );
        entries.insert(
            refresh_key(user_id, session_id),
            live_entry(&tokens.refresh_token, tokens.refresh_ttl, now),
        );
        Ok(())
    }

    async fn session_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        access_token: &str,
    ) -> AuthResult<bool> {
        self.token_matches(&access_key(user_id, session_id), access_token)
            .await
    }

    async fn refresh_token_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool> {
        self.token_matches(&refresh_key(user_id, session_id), refresh_token)
            .await
    }

    async fn consume_refresh_token(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool> {
        self.check_available()?;
        let refresh = refresh_key(user_id, session_id);
        let now = Instant::now();

        let mut entries = self.entries.lock().await;
        let matches = entries
            .get(&refresh)
            .filter(|entry| entry.is_live(now))
            .is_some_and(|entry| constant_time_eq(entry.value.as_bytes(), refresh_token.as_bytes()));
        if matches {
            entries.remove(&refresh);
            entries.remove(&access_key(user_id, session_id));
        }
        Ok(matches)
    }

    async fn delete_session(&self, user_id: &UserId, session_id: &SessionId) -> AuthResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().await;
        entries.remove(&access_key(user_id, session_id));
        entries.remove(&refresh_key(user_id, session_id));
        Ok(())
    }

    async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        self.check_available()?;
        let prefixes = user_key_patterns(user_id).map(|p| p.trim_end_matches('*').to_string());

        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !prefixes.iter().any(|p| key.starts_with(p.as_str())));
        Ok((before - entries.len()) as u64)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let slot = users.get_mut(&user.user_id).ok_or(AuthError::UserNotFound)?;
        *slot = user.clone();
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = InMemorySessionStore::new();
        let (user, session) = (UserId::new(), SessionId::new());
        store
            .create_session(&user, &session, &pair("a1", "r1"))
            .await
            .unwrap();

        assert!(store.session_exists(&user, &session, "a1").await.unwrap());
        assert!(!store.session_exists(&user, &session, "a2").await.unwrap());
        assert!(store.refresh_token_exists(&user, &session, "r1").await.unwrap());
        assert!(!store.refresh_token_exists(&user, &session, "a1").await.unwrap());

        store.delete_session(&user, &session).await.unwrap();
        assert!(!store.session_exists(&user, &session, "a1").await.unwrap());
        assert!(!store.refresh_token_exists(&user, &session, "r1").await.unwrap());

        // idempotent
        store.delete_session(&user, &session).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_key_expires_first() {
        let store = InMemorySessionStore::new();
        let (user, session) = (UserId::new(), SessionId::new());
        store
            .create_session(&user, &session, &pair("a1", "r1"))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(901)).await;
        assert!(!store.session_exists(&user, &session, "a1").await.unwrap());
        assert!(store.refresh_token_exists(&user, &session, "r1").await.unwrap());

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(!store.refresh_token_exists(&user, &session, "r1").await.unwrap());
        assert!(store.live_session_ids(&user).await.is_empty());
    }

    #[tokio::test]
    async fn test_consume_refresh_token_once() {
        let store = InMemorySessionStore::new();
        let (user, session) = (UserId::new(), SessionId::new());
        store
            .create_session(&user, &session, &pair("a1", "r1"))
            .await
            .unwrap();

        assert!(!store.consume_refresh_token(&user, &session, "wrong").await.unwrap());
        assert!(store.session_exists(&user, &session, "a1").await.unwrap());

        let (first, second) = tokio::join!(
            store.consume_refresh_token(&user, &session, "r1"),
            store.consume_refresh_token(&user, &session, "r1"),
        );
        assert!(first.unwrap() ^ second.unwrap());
        assert!(!store.session_exists(&user, &session, "a1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_sessions_for_user() {
        let store = InMemorySessionStore::new();
        let (user, other) = (UserId::new(), UserId::new());
        let (s1, s2, s3) = (SessionId::new(), SessionId::new(), SessionId::new());
        store.create_session(&user, &s1, &pair("a1", "r1")).await.unwrap();
        store.create_session(&user, &s2, &pair("a2", "r2")).await.unwrap();
        store.create_session(&other, &s3, &pair("a3", "r3")).await.unwrap();

        assert_eq!(store.live_session_ids(&user).await.len(), 2);
        assert_eq!(store.delete_all_sessions_for_user(&user).await.unwrap(), 4);
        assert!(store.live_session_ids(&user).await.is_empty());
        assert_eq!(store.live_session_ids(&other).await, vec![s3]);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = InMemorySessionStore::new();
        store.set_unavailable(true);
        let err = store
            .session_exists(&UserId::new(), &SessionId::new(), "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
    }
}
