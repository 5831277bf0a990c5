use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::errors::StoreError;
use crate::session::{Session, SessionExport};
use crate::store::SessionStore;

/// In-process session store (no persistence across restarts).
///
/// Entries live in a map of export representations. A TTL is enforced by a
/// spawned sleep-then-remove task; re-saving cancels and reschedules the
/// task, `destroy` cancels it outright.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Export representations per session id.
    index: RwLock<HashMap<String, SessionExport>>,
    /// Pending expiry tasks per session id.
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Inner {
    fn cancel_timer(&self, session_id: &str) {
        if let Some(handle) = self.timers.lock().unwrap().remove(session_id) {
            handle.abort();
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &Session, ttl: Option<Duration>) -> Result<(), StoreError> {
        let id = session.id().to_string();

        self.inner.cancel_timer(&id);
        self.inner
            .index
            .write()
            .unwrap()
            .insert(id.clone(), session.export());

        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
            let inner = Arc::clone(&self.inner);
            let key = id.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                log::debug!("memory store: session {key} expired");
                inner.index.write().unwrap().remove(&key);
                inner.timers.lock().unwrap().remove(&key);
            });
            self.inner.timers.lock().unwrap().insert(id, handle);
        }

        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Session>, StoreError> {
        let export = self.inner.index.read().unwrap().get(key).cloned();
        Ok(export.map(Session::import))
    }

    async fn destroy(&self, key: &str) -> Result<(), StoreError> {
        self.inner.cancel_timer(key);
        self.inner.index.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(100);

    fn session_with_cookie() -> Session {
        let mut session = Session::new();
        session.set_cookie("foo", "bar", "http://127.0.0.1").unwrap();
        session
    }

    #[tokio::test]
    async fn save_and_load_round_trip() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let session = session_with_cookie();

        store.save(&session, None).await?;
        let loaded = store
            .load(session.id())
            .await?
            .expect("saved session must load");

        assert_eq!(loaded.id(), session.id());
        assert_eq!(loaded.get_cookie("foo", None).unwrap().value, "bar");
        assert_eq!(loaded.jar(), session.jar());
        Ok(())
    }

    #[tokio::test]
    async fn load_of_unknown_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroy_removes_and_is_idempotent() {
        let store = MemoryStore::new();
        let session = session_with_cookie();

        store.save(&session, None).await.unwrap();
        store.destroy(session.id()).await.unwrap();
        assert!(store.load(session.id()).await.unwrap().is_none());

        // a second destroy, and one for a key that never existed
        store.destroy(session.id()).await.unwrap();
        store.destroy("never-saved").await.unwrap();
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let store = MemoryStore::new();
        let session = session_with_cookie();

        store.save(&session, Some(TTL)).await.unwrap();
        assert!(store.load(session.id()).await.unwrap().is_some());

        tokio::time::sleep(TTL + Duration::from_millis(50)).await;
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn resave_resets_the_ttl() {
        let store = MemoryStore::new();
        let session = session_with_cookie();

        store.save(&session, Some(TTL)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        // re-save at t=60ms: the original timer must not fire at t=100ms
        store.save(&session, Some(TTL)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.load(session.id()).await.unwrap().is_some());

        tokio::time::sleep(TTL).await;
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroy_cancels_pending_expiry() {
        let store = MemoryStore::new();
        let session = session_with_cookie();

        store.save(&session, Some(TTL)).await.unwrap();
        store.destroy(session.id()).await.unwrap();

        // saving again without a TTL must not be clobbered by the old timer
        store.save(&session, None).await.unwrap();
        tokio::time::sleep(TTL + Duration::from_millis(50)).await;
        assert!(store.load(session.id()).await.unwrap().is_some());
    }
}
