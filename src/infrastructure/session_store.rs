//! In-memory session store that forgets expired sessions.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

/// Session records keyed by id, held in a concurrent map.
///
/// Expired records are dropped lazily when loaded and in bulk by
/// [`ExpiredDeletion::delete_expired`], which [`spawn_reaper`] runs on a
/// fixed period. Without the reaper, sessions that are never loaded again
/// (closed browser, no logout) would stay in memory for the life of the
/// process.
///
/// [`spawn_reaper`]: ExpiringMemoryStore::spawn_reaper
#[derive(Debug, Clone, Default)]
pub struct ExpiringMemoryStore {
    records: Arc<DashMap<Id, Record>>,
}

impl ExpiringMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, expired or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Starts a background task purging expired records every `period`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_reaper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = store.delete_expired().await {
                    tracing::warn!(error = %e, "Failed to purge expired sessions");
                }
            }
        })
    }
}

fn is_active(record: &Record) -> bool {
    record.expiry_date > OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for ExpiringMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.records.remove_if(session_id, |_, record| !is_active(record));
        Ok(self.records.get(session_id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for ExpiringMemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let before = self.records.len();
        self.records.retain(|_, record| is_active(record));

        let purged = before.saturating_sub(self.records.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired sessions");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_sessions::cookie::time::Duration as TimeDuration;

    fn record(ttl: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + ttl,
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = ExpiringMemoryStore::new();
        let mut live = record(TimeDuration::minutes(30));

        store.create(&mut live).await.unwrap();

        assert_eq!(store.load(&live.id).await.unwrap(), Some(live.clone()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_load_evicts_expired() {
        let store = ExpiringMemoryStore::new();
        let stale = record(TimeDuration::minutes(-1));
        store.save(&stale).await.unwrap();

        assert_eq!(store.load(&stale.id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_records() {
        let store = ExpiringMemoryStore::new();
        let live = record(TimeDuration::minutes(30));
        store.save(&live).await.unwrap();
        for _ in 0..100 {
            store.save(&record(TimeDuration::seconds(-5))).await.unwrap();
        }
        assert_eq!(store.len(), 101);

        store.delete_expired().await.unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.load(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = ExpiringMemoryStore::new();
        let live = record(TimeDuration::minutes(30));
        store.save(&live).await.unwrap();

        store.delete(&live.id).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reaper_purges_expired() {
        let store = ExpiringMemoryStore::new();
        store.save(&record(TimeDuration::seconds(-1))).await.unwrap();

        // The first tick fires immediately.
        let reaper = store.spawn_reaper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        reaper.abort();

        assert!(store.is_empty());
    }
}
