//! Process-local key-value store.
//!
//! Counts are exact within one process: each key's read-increment-write runs
//! under the DashMap shard lock. Nothing survives a restart and nothing is
//! shared between instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{KvStore, StoreBackend, StoreError};

/// A fixed counting window for one key.
#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u64,
    expires_at: Instant,
}

impl WindowRecord {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            expires_at: now + window,
        }
    }
}

#[derive(Debug, Clone)]
struct HashRecord {
    #[cfg_attr(not(test), allow(dead_code))]
    fields: HashMap<String, String>,
    expires_at: Instant,
}

/// In-memory store backed by DashMap.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: DashMap<String, WindowRecord>,
    hashes: DashMap<String, HashRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one hit for `key` and return the count in the current window.
    pub fn hit(&self, key: &str, window: Duration) -> u64 {
        let now = Instant::now();
        match self.windows.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if now >= record.expires_at {
                    *record = WindowRecord::open(now, window);
                } else {
                    record.count += 1;
                }
                record.count
            }
            Entry::Vacant(vacant) => {
                vacant.insert(WindowRecord::open(now, window));
                1
            }
        }
    }

    /// Fields of a live hash, if present.
    #[cfg(test)]
    pub fn hash(&self, key: &str) -> Option<HashMap<String, String>> {
        let now = Instant::now();
        self.hashes
            .get(key)
            .filter(|r| now < r.expires_at)
            .map(|r| r.fields.clone())
    }

    /// Keys of live hashes starting with `prefix`.
    #[cfg(test)]
    pub fn hash_keys(&self, prefix: &str) -> Vec<String> {
        let now = Instant::now();
        self.hashes
            .iter()
            .filter(|r| now < r.expires_at && r.key().starts_with(prefix))
            .map(|r| r.key().clone())
            .collect()
    }

    /// Drop expired windows and hashes. Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len() + self.hashes.len();
        self.windows.retain(|_, r| now < r.expires_at);
        self.hashes.retain(|_, r| now < r.expires_at);
        before - (self.windows.len() + self.hashes.len())
    }

    /// Number of tracked counter windows (live or not yet swept).
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Periodically purge expired entries until shutdown is signalled.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        every: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired in-memory entries");
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::debug!("Sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn increment_window(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        Ok(self.hit(key, window))
    }

    async fn put_hash(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.hashes.insert(
            key.to_string(),
            HashRecord {
                fields,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn test_counts_within_window() {
        let store = MemoryStore::new();
        assert_eq!(store.hit("a", WINDOW), 1);
        assert_eq!(store.hit("a", WINDOW), 2);
        assert_eq!(store.hit("b", WINDOW), 1);
        assert_eq!(store.hit("a", WINDOW), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_at_expiry() {
        let store = MemoryStore::new();
        for _ in 0..7 {
            store.hit("a", WINDOW);
        }

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(store.hit("a", WINDOW), 8);

        // The window opened at t=0, so it is over at exactly t=600.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.hit("a", WINDOW), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryStore::new();
        store.hit("old", WINDOW);
        store
            .put_hash("contact:1", &[("ts", "1".into())], Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(300)).await;
        store.hit("new", WINDOW);

        assert_eq!(store.purge_expired(), 1);
        assert!(store.hash("contact:1").is_none());
        assert_eq!(store.window_count(), 2);

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.window_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hash_roundtrip_and_prefix() {
        let store = MemoryStore::new();
        store
            .put_hash(
                "autosave:#contact-form:1",
                &[("selector", "#contact-form".into()), ("ts", "1".into())],
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let fields = store.hash("autosave:#contact-form:1").unwrap();
        assert_eq!(fields["selector"], "#contact-form");
        assert_eq!(store.hash_keys("autosave:").len(), 1);
        assert!(store.hash_keys("contact:").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        store.hit("k", Duration::from_secs(1));

        let (tx, rx) = broadcast::channel(1);
        let handle = store.clone().spawn_sweeper(Duration::from_secs(5), rx);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(store.window_count(), 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
