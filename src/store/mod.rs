//! Key-value storage backends.
//!
//! # Data Flow
//! ```text
//! Rate limiter / contact handlers
//!     → KvStore (trait object, chosen once at startup)
//!         → rest.rs   (durable store over HTTPS, atomic MULTI/EXEC)
//!         → memory.rs (process-local DashMap, swept periodically)
//! ```
//!
//! # Design Decisions
//! - The durable store is optional; its absence selects the memory store
//! - Counter windows are fixed: the expiry is set once, when a window opens
//! - Callers decide how to degrade on `StoreError`; stores never panic

pub mod memory;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::StoreConfig;

pub use memory::MemoryStore;
pub use rest::RestKvStore;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned HTTP {0}")]
    Status(u16),

    #[error("store rejected command: {0}")]
    Command(String),

    #[error("unexpected store reply: {0}")]
    UnexpectedReply(String),

    #[error("invalid store endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("store endpoint '{0}' is not an http(s) URL")]
    UnsupportedEndpoint(String),
}

/// Which kind of backend is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Durable,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Durable => "durable",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Minimal key-value surface the site needs.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Count one hit against `key` and return the post-increment count.
    ///
    /// When the key is absent or its window has expired a new window of
    /// length `window` opens with a count of 1.
    async fn increment_window(&self, key: &str, window: Duration) -> Result<u64, StoreError>;

    /// Write a hash of string fields under `key`, expiring after `ttl`.
    async fn put_hash(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError>;

    fn backend(&self) -> StoreBackend;
}

/// Storage selected at startup.
#[derive(Clone)]
pub struct Stores {
    /// Backend used for rate-limit counters.
    pub counters: Arc<dyn KvStore>,

    /// Process-local store, used directly or as the fallback.
    pub memory: Arc<MemoryStore>,

    /// Durable store for submitted records; `None` when not configured.
    pub records: Option<Arc<dyn KvStore>>,
}

impl Stores {
    /// Memory-only storage.
    pub fn in_memory() -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self {
            counters: memory.clone(),
            memory,
            records: None,
        }
    }

    /// Choose backends from configuration.
    ///
    /// A configured but unusable durable store is logged and skipped.
    pub fn from_config(config: &StoreConfig, timeout: Duration) -> Self {
        let Some((url, token)) = config.credentials() else {
            tracing::info!("Durable store not configured, using in-memory rate limiting");
            return Self::in_memory();
        };

        match RestKvStore::new(url, token, timeout) {
            Ok(durable) => {
                tracing::info!(endpoint = %durable.endpoint(), "Durable store enabled");
                let durable: Arc<dyn KvStore> = Arc::new(durable);
                Self {
                    counters: durable.clone(),
                    memory: Arc::new(MemoryStore::new()),
                    records: Some(durable),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Durable store unusable, using in-memory rate limiting");
                Self::in_memory()
            }
        }
    }
}
