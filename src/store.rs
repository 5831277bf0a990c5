// src/store.rs
//! Session persistence: the [`SessionStore`] trait and its backends.
//!
//! A **session store** decouples a session's lifecycle from any one process:
//! it persists the session's export representation under its id, hands back
//! an equivalent session on load, and enforces an optional time-to-live.
//! Stores never hold a live [`Session`], only its serialized snapshot.
//!
//! Two reference implementations are provided:
//! - [`MemoryStore`]: in-process map with timer-based expiry.
//! - [`RedisStore`]: Redis-backed, with expiry delegated to native key TTLs.

mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::session::Session;

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// A handle to a type-erased session store.
///
/// Implementations must be `Send + Sync` and internally synchronized, since
/// callers hold only `&self` when invoking trait methods.
pub type SessionStoreHandle = Arc<dyn SessionStore>;

/// Persistence capability for sessions: save/load/destroy keyed by session
/// id, with optional time-to-live.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists the session's export representation under its id.
    ///
    /// `None` or a zero `ttl` means the entry never expires on its own.
    /// Saving under the same id replaces the stored representation entirely
    /// and resets the TTL.
    async fn save(&self, session: &Session, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Reconstructs the stored session for `key`, or `Ok(None)` if no live
    /// entry exists. Absence is not an error.
    async fn load(&self, key: &str) -> Result<Option<Session>, StoreError>;

    /// Removes the entry for `key` and cancels any pending expiry.
    /// Destroying a nonexistent key succeeds silently.
    async fn destroy(&self, key: &str) -> Result<(), StoreError>;
}
