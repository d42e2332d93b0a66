//! Redis Session Store
//!
//! Keys `access:{user_id}:{session_id}` and `refresh:{user_id}:{session_id}`
//! hold the raw tokens with `EX` set to each token's lifetime. Every command
//! runs under the configured timeout.

use std::future::Future;
use std::time::Duration;

use platform::crypto::constant_time_eq;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, RedisResult, Script};

use crate::domain::entity::session::{TokenPair, access_key, refresh_key, user_key_patterns};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// KEYS[1] refresh key, KEYS[2] access key, ARGV[1] presented refresh token.
const CONSUME_REFRESH_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('DEL', KEYS[1], KEYS[2])
    return 1
end
return 0
"#;

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    timeout: Duration,
    consume_script: Script,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, timeout: Duration) -> Self {
        Self {
            conn,
            timeout,
            consume_script: Script::new(CONSUME_REFRESH_SCRIPT),
        }
    }

    /// Open a managed (auto-reconnecting) connection to `url`.
    pub async fn connect(url: &str, timeout: Duration) -> AuthResult<Self> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let conn = bounded(timeout, ConnectionManager::new(client)).await?;
        Ok(Self::new(conn, timeout))
    }

    async fn token_matches(&self, key: String, presented: &str) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        let stored: Option<String> = bounded(self.timeout, conn.get(&key)).await?;
        Ok(stored.is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes())))
    }

    async fn scan_keys(&self, pattern: &str) -> AuthResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = bounded(
                self.timeout,
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn),
            )
            .await?;

            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

impl SessionStore for RedisSessionStore {
    async fn create_session(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        tokens: &TokenPair,
    ) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(
                access_key(user_id, session_id),
                &tokens.access_token,
                ttl_secs(tokens.access_ttl),
            )
            .ignore()
            .set_ex(
                refresh_key(user_id, session_id),
                &tokens.refresh_token,
                ttl_secs(tokens.refresh_ttl),
            )
            .ignore();

        let _: () = bounded(self.timeout, pipe.query_async(&mut conn)).await?;
        Ok(())
    }

    async fn session_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        access_token: &str,
    ) -> AuthResult<bool> {
        self.token_matches(access_key(user_id, session_id), access_token)
            .await
    }

    async fn refresh_token_exists(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool> {
        self.token_matches(refresh_key(user_id, session_id), refresh_token)
            .await
    }

    async fn consume_refresh_token(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        refresh_token: &str,
    ) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        let mut invocation = self.consume_script.prepare_invoke();
        invocation
            .key(refresh_key(user_id, session_id))
            .key(access_key(user_id, session_id))
            .arg(refresh_token);

        let consumed: i64 = bounded(self.timeout, invocation.invoke_async(&mut conn)).await?;
        Ok(consumed == 1)
    }

    async fn delete_session(&self, user_id: &UserId, session_id: &SessionId) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let keys = [access_key(user_id, session_id), refresh_key(user_id, session_id)];
        let _: () = bounded(self.timeout, conn.del(&keys[..])).await?;
        Ok(())
    }

    async fn delete_all_sessions_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut keys = Vec::new();
        for pattern in user_key_patterns(user_id) {
            keys.extend(self.scan_keys(&pattern).await?);
        }
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let deleted: u64 = bounded(self.timeout, conn.del(keys.as_slice())).await?;

        tracing::debug!(user_id = %user_id, deleted, "Deleted all session keys of user");
        Ok(deleted)
    }
}

/// Redis rejects `EX 0`.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> AuthResult<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(store_error),
        Err(_) => Err(AuthError::ServiceUnavailable(
            "Session store timed out".to_string(),
        )),
    }
}

fn store_error(err: RedisError) -> AuthError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        AuthError::ServiceUnavailable(format!("Session store: {}", err))
    } else {
        AuthError::Internal(format!("Session store: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_secs_never_zero() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(900)), 900);
    }

    #[tokio::test]
    async fn test_timeout_is_service_unavailable() {
        let never = std::future::pending::<RedisResult<()>>();
        let err = bounded(Duration::from_millis(10), never).await.unwrap_err();
        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_service_unavailable() {
        // Port 1 on localhost refuses connections
        let err = RedisSessionStore::connect("redis://127.0.0.1:1/", Duration::from_millis(500))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
    }
}
