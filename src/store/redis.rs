//! Redis-backed session store.
//!
//! Sessions are stored as JSON-encoded export representations under
//! namespaced keys (`<prefix><session id>`, default prefix `"sessions:"`).
//! Expiry is delegated to Redis key TTLs: a TTL'd save issues a single
//! `SET key value PX <ms>` command, so an entry can never be persisted
//! without its expiry. A TTL-less save is a plain `SET`, which also clears
//! any previous TTL on the key.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::errors::StoreError;
use crate::session::{Session, SessionExport};
use crate::store::SessionStore;

const DEFAULT_KEY_PREFIX: &str = "sessions:";

/// A session store backed by a Redis server.
///
/// The connection manager multiplexes one connection and reconnects on
/// failure; cloning it per call is cheap.
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        })
    }

    /// Replaces the default `"sessions:"` key namespace.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn save(&self, session: &Session, ttl: Option<Duration>) -> Result<(), StoreError> {
        let key = self.key(session.id());
        let payload = serde_json::to_string(&session.export())?;
        let mut conn = self.conn.clone();

        match ttl.filter(|ttl| !ttl.is_zero()) {
            Some(ttl) => {
                // single atomic write-with-expiry
                let _: () = redis::cmd("SET")
                    .arg(&key)
                    .arg(&payload)
                    .arg("PX")
                    .arg(ttl.as_millis() as u64)
                    .query_async(&mut conn)
                    .await?;
            }
            None => {
                let _: () = conn.set(&key, &payload).await?;
            }
        }

        log::debug!("redis store: saved {key} (ttl {ttl:?})");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Session>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(key)).await?;

        match raw {
            Some(raw) => {
                let export: SessionExport = serde_json::from_str(&raw)?;
                Ok(Some(Session::import(export)))
            }
            None => Ok(None),
        }
    }

    async fn destroy(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a reachable Redis server; point `REDIS_URL` at one
    //! (default `redis://127.0.0.1:6379`) and run with `--ignored`.

    use super::*;

    async fn store() -> RedisStore {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        RedisStore::connect(&url).await.unwrap()
    }

    fn session_with_cookie() -> Session {
        let mut session = Session::new();
        session.set_cookie("foo", "bar", "http://127.0.0.1").unwrap();
        session
    }

    #[tokio::test]
    #[ignore = "requires a running redis server"]
    async fn save_load_destroy_round_trip() -> anyhow::Result<()> {
        let store = store().await;
        let session = session_with_cookie();

        store.save(&session, None).await?;
        let loaded = store
            .load(session.id())
            .await?
            .expect("saved session must load");
        assert_eq!(loaded.id(), session.id());
        assert_eq!(loaded.get_cookie("foo", None).unwrap().value, "bar");

        store.destroy(session.id()).await?;
        assert!(store.load(session.id()).await?.is_none());

        // destroy of an already-destroyed key succeeds silently
        store.destroy(session.id()).await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running redis server"]
    async fn entry_expires_after_ttl() {
        let store = store().await;
        let session = session_with_cookie();

        store
            .save(&session, Some(Duration::from_millis(100)))
            .await
            .unwrap();
        assert!(store.load(session.id()).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running redis server"]
    async fn keys_are_namespaced() {
        let store = store().await.with_key_prefix("deputy-test:");
        assert_eq!(store.key("abc"), "deputy-test:abc");

        let session = session_with_cookie();
        store.save(&session, None).await.unwrap();
        assert!(store.load(session.id()).await.unwrap().is_some());
        store.destroy(session.id()).await.unwrap();
    }
}
