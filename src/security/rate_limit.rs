//! Fixed-window rate limiting for form submissions.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::observability::metrics;
use crate::store::{KvStore, MemoryStore, StoreBackend};

/// Requests allowed per client per window.
pub const MAX_REQUESTS: u64 = 5;

/// Length of one counting window.
pub const WINDOW: Duration = Duration::from_secs(600);

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u64,
}

impl RateDecision {
    fn from_count(count: u64, max: u64) -> Self {
        if count > max {
            Self {
                allowed: false,
                remaining: 0,
            }
        } else {
            Self {
                allowed: true,
                remaining: max - count,
            }
        }
    }
}

/// Per-client fixed-window limiter.
///
/// Counts go to the store chosen at startup. If that store fails, the call is
/// counted in the process-local fallback instead; a store error never denies
/// a request on its own.
pub struct RateLimiter {
    scope: String,
    store: Arc<dyn KvStore>,
    fallback: Arc<MemoryStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(scope: impl Into<String>, store: Arc<dyn KvStore>, fallback: Arc<MemoryStore>) -> Self {
        Self {
            scope: scope.into(),
            store,
            fallback,
            max_requests: MAX_REQUESTS,
            window: WINDOW,
        }
    }

    /// Window length, as advertised in `Retry-After`.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn backend(&self) -> StoreBackend {
        self.store.backend()
    }

    /// Count a request from `client_key` and decide whether to allow it.
    pub async fn check(&self, client_key: &str) -> RateDecision {
        let key = format!("rl:{}:{}", self.scope, client_key);

        let count = match self.store.increment_window(&key, self.window).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Rate limit store failed, counting in memory");
                metrics::record_store_error("increment");
                self.fallback.hit(&key, self.window)
            }
        };

        let decision = RateDecision::from_count(count, self.max_requests);
        if !decision.allowed {
            tracing::warn!(client = %client_key, scope = %self.scope, count, "Rate limit exceeded");
            metrics::record_rate_limited(&self.scope);
        }
        decision
    }
}

/// Identifier a client is rate limited under.
///
/// First entry of `X-Forwarded-For`, else the peer address, else `"unknown"`.
/// The forwarded header is taken as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl ClientKey {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return Self(ip.to_string());
        }

        match peer {
            Some(addr) => Self(addr.ip().to_string()),
            None => Self(Self::UNKNOWN.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use axum::http::HeaderValue;

    struct FailingStore;

    #[async_trait]
    impl KvStore for FailingStore {
        async fn increment_window(&self, _key: &str, _window: Duration) -> Result<u64, StoreError> {
            Err(StoreError::Status(503))
        }

        async fn put_hash(
            &self,
            _key: &str,
            _fields: &[(&str, String)],
            _ttl: Duration,
        ) -> Result<(), StoreError> {
            Err(StoreError::Status(503))
        }

        fn backend(&self) -> StoreBackend {
            StoreBackend::Durable
        }
    }

    fn memory_limiter() -> RateLimiter {
        let memory = Arc::new(MemoryStore::new());
        RateLimiter::new("contact", memory.clone(), memory)
    }

    async fn run(limiter: &RateLimiter, key: &str, n: usize) -> Vec<RateDecision> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(limiter.check(key).await);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_request_denied() {
        let limiter = memory_limiter();
        let decisions = run(&limiter, "1.2.3.4", 6).await;

        let allowed: Vec<bool> = decisions.iter().map(|d| d.allowed).collect();
        let remaining: Vec<u64> = decisions.iter().map(|d| d.remaining).collect();
        assert_eq!(allowed, [true, true, true, true, true, false]);
        assert_eq!(remaining, [4, 3, 2, 1, 0, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stays_denied_for_rest_of_window() {
        let limiter = memory_limiter();
        run(&limiter, "1.2.3.4", 6).await;

        tokio::time::advance(Duration::from_secs(300)).await;
        let d = limiter.check("1.2.3.4").await;
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_window_after_expiry() {
        let limiter = memory_limiter();
        run(&limiter, "1.2.3.4", 9).await;

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        let d = limiter.check("1.2.3.4").await;
        assert_eq!(
            d,
            RateDecision {
                allowed: true,
                remaining: MAX_REQUESTS - 1
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_admit_exactly_max() {
        let limiter = Arc::new(memory_limiter());

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check("k").await })
            })
            .collect();

        let mut decisions = Vec::with_capacity(handles.len());
        for handle in handles {
            decisions.push(handle.await.unwrap());
        }

        let mut remaining: Vec<u64> = decisions
            .iter()
            .filter(|d| d.allowed)
            .map(|d| d.remaining)
            .collect();
        remaining.sort_unstable();
        assert_eq!(remaining, [0, 1, 2, 3, 4]);
        assert!(decisions
            .iter()
            .filter(|d| !d.allowed)
            .all(|d| d.remaining == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_counted_separately() {
        let limiter = memory_limiter();
        run(&limiter, "1.2.3.4", 6).await;
        assert!(limiter.check("5.6.7.8").await.allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_falls_back_to_memory() {
        let fallback = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new("contact", Arc::new(FailingStore), fallback.clone());

        let decisions = run(&limiter, "1.2.3.4", 6).await;
        assert!(decisions[..5].iter().all(|d| d.allowed));
        assert!(!decisions[5].allowed);
        assert_eq!(fallback.window_count(), 1);
        assert_eq!(limiter.backend(), StoreBackend::Durable);
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        assert_eq!(
            ClientKey::from_headers(&headers, Some(peer)).as_str(),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_client_key_peer_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 10.0.0.1"));
        let peer: SocketAddr = "192.0.2.1:5000".parse().unwrap();

        assert_eq!(ClientKey::from_headers(&headers, Some(peer)).as_str(), "192.0.2.1");
        assert_eq!(
            ClientKey::from_headers(&HeaderMap::new(), None).as_str(),
            ClientKey::UNKNOWN
        );
    }
}
