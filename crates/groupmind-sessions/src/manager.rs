use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use tracing::{debug, instrument};

use groupmind_core::types::SessionId;
use groupmind_store::{Session, Store};

use crate::error::Result;

/// Keeps a bounded number of sessions hot in memory.
///
/// The LRU only governs cache membership — evicting a session here never
/// touches its rows in the [`Store`], which remains the source of truth.
pub struct SessionManager {
    store: std::sync::Arc<Store>,
    cache: Mutex<LruCache<SessionId, Session>>,
}

impl SessionManager {
    pub fn new(store: std::sync::Arc<Store>, max_sessions: usize) -> Self {
        let capacity = NonZeroUsize::new(max_sessions.max(1)).unwrap();
        Self {
            store,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the session for `id`, creating it in the store if absent, and
    /// promote it to most-recently-used.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn get_or_create(&self, id: &SessionId, target_id: i64) -> Result<Session> {
        {
            let mut cache = self.cache.lock().unwrap();
            if let Some(session) = cache.get(id) {
                return Ok(session.clone());
            }
        }

        let session = self.store.get_or_create_session(id, target_id)?;
        let mut cache = self.cache.lock().unwrap();
        cache.put(id.clone(), session.clone());
        Ok(session)
    }

    /// Refresh `updated_at` in the store and move the entry to MRU in the
    /// cache.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn touch(&self, id: &SessionId) -> Result<()> {
        self.store.touch_session(id)?;
        let mut cache = self.cache.lock().unwrap();
        if let Some(session) = cache.get_mut(id) {
            session.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    /// Delete all messages and clear compressed context, preserving the
    /// session's identity row.
    #[instrument(skip(self), fields(session_id = %id))]
    pub fn reset(&self, id: &SessionId) -> Result<()> {
        self.store.reset_session(id)?;
        let mut cache = self.cache.lock().unwrap();
        if let Some(session) = cache.get_mut(id) {
            session.compressed_context = None;
        }
        debug!("session reset");
        Ok(())
    }

    pub fn store(&self) -> &std::sync::Arc<Store> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_sessions: usize) -> SessionManager {
        let store = std::sync::Arc::new(Store::open_in_memory().unwrap());
        SessionManager::new(store, max_sessions)
    }

    #[test]
    fn get_or_create_reuses_cached_session() {
        let mgr = manager(10);
        let id = SessionId::group(1);
        let first = mgr.get_or_create(&id, 1).unwrap();
        let second = mgr.get_or_create(&id, 1).unwrap();
        assert_eq!(first.created_at, second.created_at);
    }

    #[test]
    fn eviction_drops_cache_entry_but_store_row_survives() {
        let mgr = manager(1);
        let a = SessionId::group(1);
        let b = SessionId::group(2);

        mgr.get_or_create(&a, 1).unwrap();
        mgr.get_or_create(&b, 2).unwrap();

        // `a` was evicted from the LRU (capacity 1), but its store row remains.
        let reloaded = mgr.store().get_session(&a).unwrap();
        assert!(reloaded.is_some());
    }

    #[test]
    fn reset_clears_compressed_context() {
        let mgr = manager(10);
        let id = SessionId::group(1);
        mgr.get_or_create(&id, 1).unwrap();
        mgr.store().set_compressed_context(&id, Some("summary")).unwrap();

        mgr.reset(&id).unwrap();

        let session = mgr.store().get_session(&id).unwrap().unwrap();
        assert_eq!(session.compressed_context, None);
    }
}
